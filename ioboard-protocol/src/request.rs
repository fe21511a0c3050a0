//! Host requests
//!
//! Every request the host can send, with its encoding and the exact size
//! of the reply the board answers it with.

use heapless::Vec;

use crate::frame::{Frame, FrameError, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
use crate::options::{EdgeMode, GpioOptions, I2cSpeed};
use crate::pins::{AnalogPin, CounterPin, DigitalPin, ServoPin};
use crate::reply::{Reply, ReplyError};
use crate::tags::{AnalogOp, ClassTag, CounterOp, GpioOp, I2cOp, MiscOp, ServoOp};
use crate::ANALOG_CHANNELS;

/// Reply size of a bare acknowledgement: tags, status, checksum
pub const ACK_REPLY_LEN: usize = 4;

/// A request from the host to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request<'a> {
    /// Acknowledge, then let the watchdog restart the board
    Reset,
    /// Read the 16-bit board identifier
    GetId,
    /// Sample the on-die temperature sensor
    GetTemperature,
    GpioConfig {
        pin: DigitalPin,
        options: GpioOptions,
    },
    /// Read the level and the edges seen since the last read
    GpioRead {
        pin: DigitalPin,
    },
    GpioWrite {
        pin: DigitalPin,
        high: bool,
    },
    AnalogRead {
        pin: AnalogPin,
    },
    /// Sample all six analog channels
    AnalogReadAll,
    I2cConfig {
        speed: I2cSpeed,
    },
    /// Read `length` bytes from register `offset` of device `address`
    I2cRead {
        address: u8,
        offset: u8,
        length: u8,
    },
    /// Write `data` to register `offset` of device `address`
    I2cWrite {
        address: u8,
        offset: u8,
        data: &'a [u8],
    },
    /// Attach a servo and set its initial pulse width (µs)
    ServoConfig {
        pin: ServoPin,
        pulse_us: u16,
    },
    /// Update the pulse width (µs) of an attached servo
    ServoSet {
        pin: ServoPin,
        pulse_us: u16,
    },
    /// Arm the edge counter and clear its count
    CounterConfig {
        pin: CounterPin,
        mode: EdgeMode,
    },
    /// Read and clear the edge count
    CounterRead {
        pin: CounterPin,
    },
}

impl Request<'_> {
    /// Class and data tag bytes of this request
    pub fn tags(&self) -> (u8, u8) {
        let (class, data) = match self {
            Request::Reset => (ClassTag::Misc, MiscOp::Reset.to_byte()),
            Request::GetId => (ClassTag::Misc, MiscOp::GetId.to_byte()),
            Request::GetTemperature => (ClassTag::Misc, MiscOp::GetTemp.to_byte()),
            Request::GpioConfig { .. } => (ClassTag::Gpio, GpioOp::Config.to_byte()),
            Request::GpioRead { .. } => (ClassTag::Gpio, GpioOp::Read.to_byte()),
            Request::GpioWrite { .. } => (ClassTag::Gpio, GpioOp::Write.to_byte()),
            Request::AnalogRead { .. } => (ClassTag::Analog, AnalogOp::Read.to_byte()),
            Request::AnalogReadAll => (ClassTag::Analog, AnalogOp::ReadAll.to_byte()),
            Request::I2cConfig { .. } => (ClassTag::I2c, I2cOp::Config.to_byte()),
            Request::I2cRead { .. } => (ClassTag::I2c, I2cOp::Read.to_byte()),
            Request::I2cWrite { .. } => (ClassTag::I2c, I2cOp::Write.to_byte()),
            Request::ServoConfig { .. } => (ClassTag::Servo, ServoOp::Config.to_byte()),
            Request::ServoSet { .. } => (ClassTag::Servo, ServoOp::Set.to_byte()),
            Request::CounterConfig { .. } => (ClassTag::Counter, CounterOp::Config.to_byte()),
            Request::CounterRead { .. } => (ClassTag::Counter, CounterOp::Read.to_byte()),
        };
        (class.to_byte(), data)
    }

    /// Encode this request into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let (class, data) = self.tags();
        let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();

        match *self {
            Request::Reset
            | Request::GetId
            | Request::GetTemperature
            | Request::AnalogReadAll => {}
            Request::GpioConfig { pin, options } => {
                push_all(&mut payload, &[pin.number(), options.to_byte()])?;
            }
            Request::GpioRead { pin } => push_all(&mut payload, &[pin.number()])?,
            Request::GpioWrite { pin, high } => {
                push_all(&mut payload, &[pin.number(), high as u8])?;
            }
            Request::AnalogRead { pin } => push_all(&mut payload, &[pin.channel()])?,
            Request::I2cConfig { speed } => push_all(&mut payload, &[speed.to_byte()])?,
            Request::I2cRead {
                address,
                offset,
                length,
            } => push_all(&mut payload, &[address, offset, length])?,
            Request::I2cWrite {
                address,
                offset,
                data,
            } => {
                let length = u8::try_from(data.len()).map_err(|_| FrameError::PayloadTooLarge)?;
                push_all(&mut payload, &[address, offset, length])?;
                push_all(&mut payload, data)?;
            }
            Request::ServoConfig { pin, pulse_us } | Request::ServoSet { pin, pulse_us } => {
                let [hi, lo] = pulse_us.to_be_bytes();
                push_all(&mut payload, &[pin.number(), hi, lo])?;
            }
            Request::CounterConfig { pin, mode } => {
                push_all(&mut payload, &[pin.number(), mode.to_options()])?;
            }
            Request::CounterRead { pin } => push_all(&mut payload, &[pin.number()])?,
        }

        Frame::new(class, data, &payload)
    }

    /// Encode this request straight to wire bytes
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        self.to_frame()?.encode_to_vec()
    }

    /// Number of bytes in the board's reply to this request
    ///
    /// A rejected request is answered with a reply of the same size.
    pub fn reply_len(&self) -> usize {
        match self {
            Request::GetId | Request::GetTemperature | Request::AnalogRead { .. } => {
                ACK_REPLY_LEN + 2
            }
            Request::GpioRead { .. } | Request::CounterRead { .. } => ACK_REPLY_LEN + 1,
            Request::AnalogReadAll => ACK_REPLY_LEN + 2 * ANALOG_CHANNELS,
            Request::I2cRead { length, .. } => ACK_REPLY_LEN + *length as usize,
            Request::Reset
            | Request::GpioConfig { .. }
            | Request::GpioWrite { .. }
            | Request::I2cConfig { .. }
            | Request::I2cWrite { .. }
            | Request::ServoConfig { .. }
            | Request::ServoSet { .. }
            | Request::CounterConfig { .. } => ACK_REPLY_LEN,
        }
    }

    /// Decode the board's answer to this request
    pub fn decode_reply(&self, bytes: &[u8]) -> Result<Reply, ReplyError> {
        Reply::decode(self, bytes)
    }
}

fn push_all(payload: &mut Vec<u8, MAX_PAYLOAD_SIZE>, bytes: &[u8]) -> Result<(), FrameError> {
    payload
        .extend_from_slice(bytes)
        .map_err(|_| FrameError::PayloadTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digital(n: u8) -> DigitalPin {
        DigitalPin::new(n).unwrap()
    }

    #[test]
    fn test_reset_encoding() {
        let bytes = Request::Reset.encode_to_vec().unwrap();
        assert_eq!(&bytes[..], &[0x01, 0x01, 0x02]);
        assert_eq!(Request::Reset.reply_len(), 4);
    }

    #[test]
    fn test_gpio_write_encoding() {
        let req = Request::GpioWrite {
            pin: digital(13),
            high: true,
        };
        assert_eq!(&req.encode_to_vec().unwrap()[..], &[0x02, 0x03, 13, 1, 19]);
        assert_eq!(req.reply_len(), 4);
    }

    #[test]
    fn test_gpio_config_encoding() {
        let req = Request::GpioConfig {
            pin: digital(4),
            options: GpioOptions::input(true),
        };
        assert_eq!(&req.encode_to_vec().unwrap()[..], &[0x02, 0x01, 4, 0x04, 11]);
    }

    #[test]
    fn test_servo_pulse_is_big_endian() {
        let req = Request::ServoSet {
            pin: ServoPin::D9,
            pulse_us: 1500,
        };
        let bytes = req.encode_to_vec().unwrap();
        assert_eq!(&bytes[..5], &[0x05, 0x02, 9, 0x05, 0xDC]);
    }

    #[test]
    fn test_i2c_write_encoding() {
        let req = Request::I2cWrite {
            address: 0x50,
            offset: 0x10,
            data: &[0xAA, 0xBB],
        };
        let bytes = req.encode_to_vec().unwrap();
        assert_eq!(&bytes[..7], &[0x04, 0x03, 0x50, 0x10, 2, 0xAA, 0xBB]);
        assert_eq!(bytes.len(), 8);
        assert!(crate::frame::verify(&bytes));
    }

    #[test]
    fn test_i2c_write_too_long() {
        let data = [0u8; 256];
        let req = Request::I2cWrite {
            address: 0x50,
            offset: 0,
            data: &data,
        };
        assert_eq!(req.to_frame(), Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_reply_lengths() {
        assert_eq!(Request::GetId.reply_len(), 6);
        assert_eq!(Request::GetTemperature.reply_len(), 6);
        assert_eq!(Request::GpioRead { pin: digital(2) }.reply_len(), 5);
        assert_eq!(
            Request::AnalogRead {
                pin: AnalogPin::ALL[0]
            }
            .reply_len(),
            6
        );
        assert_eq!(Request::AnalogReadAll.reply_len(), 16);
        assert_eq!(
            Request::I2cRead {
                address: 0x50,
                offset: 0,
                length: 12
            }
            .reply_len(),
            16
        );
        assert_eq!(
            Request::CounterRead {
                pin: CounterPin::D2
            }
            .reply_len(),
            5
        );
    }
}
