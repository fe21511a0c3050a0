//! Reply decoding on the host side
//!
//! The host knows which request it sent, so it knows how many bytes the
//! reply has and how to read its data fields. Checks run in a fixed order:
//! length, echoed tags, checksum, then the status byte.

use heapless::Vec;

use crate::frame::verify;
use crate::options::PinSample;
use crate::request::Request;
use crate::tags::Status;
use crate::ANALOG_CHANNELS;

/// Errors found while decoding a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyError {
    /// Reply has the wrong number of bytes for the request
    Length { expected: usize, found: usize },
    /// Reply does not echo the request's class and data tags
    TagMismatch { expected: (u8, u8), found: (u8, u8) },
    /// Reply checksum does not match its contents
    InvalidChecksum,
    /// The board answered NOK
    Rejected,
}

impl core::fmt::Display for ReplyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReplyError::Length { expected, found } => {
                write!(f, "expected {expected} reply bytes, got {found}")
            }
            ReplyError::TagMismatch { expected, found } => write!(
                f,
                "reply tags {:02x}/{:02x} do not match request {:02x}/{:02x}",
                found.0, found.1, expected.0, expected.1
            ),
            ReplyError::InvalidChecksum => f.write_str("reply checksum mismatch"),
            ReplyError::Rejected => f.write_str("board answered NOK"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReplyError {}

/// Decoded reply data
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    /// Status-only acknowledgement
    Ack,
    BoardId(u16),
    /// Raw on-die temperature sensor reading
    Temperature(u16),
    Pin(PinSample),
    /// Raw reading of one analog channel
    Analog(u16),
    /// Raw readings of channels 0-5
    AnalogAll([u16; ANALOG_CHANNELS]),
    I2cData(Vec<u8, 255>),
    /// Edge count since the previous read
    Count(u8),
}

impl Reply {
    /// Decode the reply the board sent for `request`
    pub fn decode(request: &Request<'_>, bytes: &[u8]) -> Result<Self, ReplyError> {
        let expected = request.reply_len();
        if bytes.len() != expected {
            return Err(ReplyError::Length {
                expected,
                found: bytes.len(),
            });
        }

        let tags = request.tags();
        let found = (bytes[0], bytes[1]);
        if found != tags {
            return Err(ReplyError::TagMismatch {
                expected: tags,
                found,
            });
        }

        if !verify(bytes) {
            return Err(ReplyError::InvalidChecksum);
        }

        if bytes[2] != Status::Ok.to_byte() {
            return Err(ReplyError::Rejected);
        }

        let data = &bytes[3..bytes.len() - 1];
        let reply = match request {
            Request::GetId => Reply::BoardId(be_u16(data, 0)),
            Request::GetTemperature => Reply::Temperature(be_u16(data, 0)),
            Request::GpioRead { .. } => Reply::Pin(PinSample::from_byte(data[0])),
            Request::AnalogRead { .. } => Reply::Analog(be_u16(data, 0)),
            Request::AnalogReadAll => {
                let mut readings = [0u16; ANALOG_CHANNELS];
                for (i, reading) in readings.iter_mut().enumerate() {
                    *reading = be_u16(data, 2 * i);
                }
                Reply::AnalogAll(readings)
            }
            Request::I2cRead { .. } => {
                let mut out = Vec::new();
                // Length was bounded by the u8 length field
                let _ = out.extend_from_slice(data);
                Reply::I2cData(out)
            }
            Request::CounterRead { .. } => Reply::Count(data[0]),
            Request::Reset
            | Request::GpioConfig { .. }
            | Request::GpioWrite { .. }
            | Request::I2cConfig { .. }
            | Request::I2cWrite { .. }
            | Request::ServoConfig { .. }
            | Request::ServoSet { .. }
            | Request::CounterConfig { .. } => Reply::Ack,
        };

        Ok(reply)
    }
}

fn be_u16(data: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([data[at], data[at + 1]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::checksum;
    use crate::pins::{AnalogPin, CounterPin, DigitalPin};

    fn with_checksum<const N: usize>(body: &[u8]) -> Vec<u8, N> {
        let mut out = Vec::new();
        out.extend_from_slice(body).unwrap();
        out.push(checksum(body)).unwrap();
        out
    }

    #[test]
    fn test_decode_reset_ack() {
        let reply = Reply::decode(&Request::Reset, &[0x01, 0x01, 0x01, 0x03]).unwrap();
        assert_eq!(reply, Reply::Ack);
    }

    #[test]
    fn test_decode_board_id() {
        let bytes = with_checksum::<8>(&[0x01, 0x02, 0x01, 0x00, 0x02]);
        assert_eq!(
            Reply::decode(&Request::GetId, &bytes),
            Ok(Reply::BoardId(0x0002))
        );
    }

    #[test]
    fn test_decode_analog_all_order() {
        let mut body = Vec::<u8, 16>::new();
        body.extend_from_slice(&[0x03, 0x03, 0x01]).unwrap();
        for ch in 0..6u16 {
            body.extend_from_slice(&(ch * 100).to_be_bytes()).unwrap();
        }
        let bytes = with_checksum::<16>(&body);
        assert_eq!(
            Reply::decode(&Request::AnalogReadAll, &bytes),
            Ok(Reply::AnalogAll([0, 100, 200, 300, 400, 500]))
        );
    }

    #[test]
    fn test_decode_gpio_sample() {
        let req = Request::GpioRead {
            pin: DigitalPin::new(7).unwrap(),
        };
        let bytes = with_checksum::<8>(&[0x02, 0x02, 0x01, 0b011]);
        let reply = Reply::decode(&req, &bytes).unwrap();
        assert_eq!(
            reply,
            Reply::Pin(PinSample {
                high: true,
                rose: true,
                fell: false
            })
        );
    }

    #[test]
    fn test_decode_i2c_data() {
        let req = Request::I2cRead {
            address: 0x50,
            offset: 0,
            length: 3,
        };
        let bytes = with_checksum::<8>(&[0x04, 0x02, 0x01, 9, 8, 7]);
        match Reply::decode(&req, &bytes).unwrap() {
            Reply::I2cData(data) => assert_eq!(&data[..], &[9, 8, 7]),
            other => panic!("unexpected reply {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejected() {
        let req = Request::AnalogRead {
            pin: AnalogPin::ALL[0],
        };
        let bytes = with_checksum::<8>(&[0x03, 0x02, 0x00, 0x00, 0x00]);
        assert_eq!(Reply::decode(&req, &bytes), Err(ReplyError::Rejected));
    }

    #[test]
    fn test_decode_checks_tags_before_checksum() {
        let req = Request::CounterRead {
            pin: CounterPin::D2,
        };
        // Wrong data tag and wrong checksum: the tag error wins
        let result = Reply::decode(&req, &[0x06, 0x01, 0x01, 0x05, 0x00]);
        assert_eq!(
            result,
            Err(ReplyError::TagMismatch {
                expected: (0x06, 0x02),
                found: (0x06, 0x01)
            })
        );
    }

    #[test]
    fn test_decode_bad_checksum() {
        let result = Reply::decode(&Request::Reset, &[0x01, 0x01, 0x01, 0x04]);
        assert_eq!(result, Err(ReplyError::InvalidChecksum));
    }

    #[test]
    fn test_decode_wrong_length() {
        let result = Reply::decode(&Request::GetId, &[0x01, 0x02, 0x01, 0x04]);
        assert_eq!(
            result,
            Err(ReplyError::Length {
                expected: 6,
                found: 4
            })
        );
    }
}
