//! Blocking request/reply client
//!
//! [`Client`] works over anything that is `Read + Write`: a serial port in
//! production, an in-memory link in tests. Each call writes one request
//! frame and reads exactly the number of bytes the reply to that request
//! has, then decodes it.

use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

use log::{debug, warn};

use ioboard_protocol::{
    AnalogPin, CounterPin, DigitalPin, EdgeMode, GpioOptions, I2cSpeed, PinSample, Reply,
    ReplyError, Request, ServoPin, ANALOG_CHANNELS, I2C_WRITE_CAPACITY,
};

use crate::config::DEFAULT_ANALOG_REFERENCE;
use crate::error::{Error, Result};

/// Full-scale analog reading plus one
const ANALOG_FULL_SCALE: f32 = 1024.0;

/// Reference of the die temperature sensor conversion
const TEMPERATURE_REFERENCE: f32 = 1.1;

/// Connection to one board
pub struct Client<T> {
    port: T,
    reply_timeout: Option<Duration>,
    analog_reference: f32,
}

impl<T: Read + Write> Client<T> {
    pub fn new(port: T) -> Self {
        Self {
            port,
            reply_timeout: None,
            analog_reference: DEFAULT_ANALOG_REFERENCE,
        }
    }

    /// Fail a request whose reply has not fully arrived after `timeout`
    ///
    /// `None` waits indefinitely.
    pub fn with_reply_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Voltage a full-scale analog reading corresponds to
    pub fn with_analog_reference(mut self, volts: f32) -> Self {
        self.analog_reference = volts;
        self
    }

    pub fn get_ref(&self) -> &T {
        &self.port
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.port
    }

    pub fn into_inner(self) -> T {
        self.port
    }

    /// Ask the board to restart
    ///
    /// The board acknowledges, then stops refreshing its watchdog. Wait
    /// for it to come back before sending anything else.
    pub fn reset(&mut self) -> Result<()> {
        self.ack(Request::Reset)
    }

    pub fn board_id(&mut self) -> Result<u16> {
        match self.transact(Request::GetId)? {
            Reply::BoardId(id) => Ok(id),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    /// Raw on-die temperature sensor reading
    pub fn temperature_raw(&mut self) -> Result<u16> {
        match self.transact(Request::GetTemperature)? {
            Reply::Temperature(raw) => Ok(raw),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    /// Temperature sensor reading scaled against the 1.1 V internal reference
    pub fn temperature(&mut self) -> Result<f32> {
        let raw = self.temperature_raw()?;
        Ok(raw as f32 * TEMPERATURE_REFERENCE / ANALOG_FULL_SCALE)
    }

    pub fn gpio_config(&mut self, pin: DigitalPin, options: GpioOptions) -> Result<()> {
        self.ack(Request::GpioConfig { pin, options })
    }

    /// Make `pin` an input, optionally pulled up
    pub fn gpio_input(&mut self, pin: DigitalPin, pull_up: bool) -> Result<()> {
        self.gpio_config(pin, GpioOptions::input(pull_up))
    }

    /// Make `pin` an output driven to `level`
    pub fn gpio_output(&mut self, pin: DigitalPin, level: bool) -> Result<()> {
        self.gpio_config(pin, GpioOptions::output(level))
    }

    /// Current level plus the edges seen since the previous read
    pub fn gpio_read(&mut self, pin: DigitalPin) -> Result<PinSample> {
        match self.transact(Request::GpioRead { pin })? {
            Reply::Pin(sample) => Ok(sample),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    pub fn gpio_write(&mut self, pin: DigitalPin, high: bool) -> Result<()> {
        self.ack(Request::GpioWrite { pin, high })
    }

    pub fn analog_read(&mut self, pin: AnalogPin) -> Result<u16> {
        match self.transact(Request::AnalogRead { pin })? {
            Reply::Analog(raw) => Ok(raw),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    pub fn analog_voltage(&mut self, pin: AnalogPin) -> Result<f32> {
        let raw = self.analog_read(pin)?;
        Ok(self.to_volts(raw))
    }

    /// Raw readings of channels 0-5, sampled in one request
    pub fn analog_read_all(&mut self) -> Result<[u16; ANALOG_CHANNELS]> {
        match self.transact(Request::AnalogReadAll)? {
            Reply::AnalogAll(readings) => Ok(readings),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    pub fn analog_voltages(&mut self) -> Result<[f32; ANALOG_CHANNELS]> {
        let raw = self.analog_read_all()?;
        Ok(raw.map(|r| self.to_volts(r)))
    }

    pub fn i2c_config(&mut self, speed: I2cSpeed) -> Result<()> {
        self.ack(Request::I2cConfig { speed })
    }

    /// Read `length` bytes from register `offset` of device `address`
    pub fn i2c_read(&mut self, address: u8, offset: u8, length: u8) -> Result<Vec<u8>> {
        if length == 0 {
            return Err(Error::InvalidArgument("I2C read length must be 1-255"));
        }
        match self.transact(Request::I2cRead {
            address,
            offset,
            length,
        })? {
            Reply::I2cData(data) => Ok(data.to_vec()),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    /// Write `data` starting at register `offset` of device `address`
    pub fn i2c_write(&mut self, address: u8, offset: u8, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() > I2C_WRITE_CAPACITY {
            return Err(Error::InvalidArgument("I2C write length must be 1-8"));
        }
        self.ack(Request::I2cWrite {
            address,
            offset,
            data,
        })
    }

    /// Attach a servo with an initial pulse width in microseconds
    pub fn servo_config(&mut self, pin: ServoPin, pulse_us: u16) -> Result<()> {
        self.ack(Request::ServoConfig { pin, pulse_us })
    }

    /// Set the pulse width of an attached servo; the board clamps it to
    /// 1000-2000 µs
    pub fn servo_set(&mut self, pin: ServoPin, pulse_us: u16) -> Result<()> {
        self.ack(Request::ServoSet { pin, pulse_us })
    }

    /// Start counting `mode` edges on `pin` from zero
    pub fn counter_config(&mut self, pin: CounterPin, mode: EdgeMode) -> Result<()> {
        self.ack(Request::CounterConfig { pin, mode })
    }

    /// Edges counted since the previous read (wraps at 256)
    pub fn counter_read(&mut self, pin: CounterPin) -> Result<u8> {
        match self.transact(Request::CounterRead { pin })? {
            Reply::Count(count) => Ok(count),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    fn to_volts(&self, raw: u16) -> f32 {
        raw as f32 * self.analog_reference / ANALOG_FULL_SCALE
    }

    fn ack(&mut self, request: Request<'_>) -> Result<()> {
        match self.transact(request)? {
            Reply::Ack => Ok(()),
            other => Err(Error::UnexpectedReply(other)),
        }
    }

    /// Send one request and decode its reply
    fn transact(&mut self, request: Request<'_>) -> Result<Reply> {
        let frame = request
            .encode_to_vec()
            .map_err(|_| Error::InvalidArgument("request does not fit in a frame"))?;
        debug!("-> {:02x?}", frame.as_slice());
        self.port.write_all(&frame)?;
        self.port.flush()?;

        let mut reply = vec![0u8; request.reply_len()];
        self.read_reply(&mut reply)?;
        debug!("<- {:02x?}", reply);

        request.decode_reply(&reply).map_err(|e| {
            if e == ReplyError::Rejected {
                warn!("Board rejected {:?}", request);
            } else {
                warn!("Bad reply to {:?}: {}", request, e);
            }
            Error::Reply(e)
        })
    }

    /// Fill `buf` from the port, waiting across read timeouts
    fn read_reply(&mut self, buf: &mut [u8]) -> Result<()> {
        let started = Instant::now();
        let mut filled = 0;

        while filled < buf.len() {
            match self.port.read(&mut buf[filled..]) {
                Ok(0) => return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into()),
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    if let Some(limit) = self.reply_timeout {
                        if started.elapsed() >= limit {
                            warn!("Reply timed out with {}/{} bytes", filled, buf.len());
                            return Err(Error::Timeout(limit));
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Link that replays canned reply bytes and records what was sent
    struct Scripted {
        sent: Vec<u8>,
        replies: VecDeque<u8>,
    }

    impl Scripted {
        fn new(replies: &[u8]) -> Self {
            Self {
                sent: Vec::new(),
                replies: replies.iter().copied().collect(),
            }
        }
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            // One byte at a time, like a slow serial line
            match (self.replies.pop_front(), buf.first_mut()) {
                (Some(byte), Some(slot)) => {
                    *slot = byte;
                    Ok(1)
                }
                _ => Err(io::ErrorKind::TimedOut.into()),
            }
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.sent.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn d(n: u8) -> DigitalPin {
        DigitalPin::new(n).unwrap()
    }

    #[test]
    fn test_gpio_write_sends_frame() {
        let mut client = Client::new(Scripted::new(&[0x02, 0x03, 0x01, 0x06]));
        client.gpio_write(d(13), true).unwrap();
        assert_eq!(client.get_ref().sent, [0x02, 0x03, 0x0D, 0x01, 0x13]);
    }

    #[test]
    fn test_board_id() {
        let mut client = Client::new(Scripted::new(&[0x01, 0x02, 0x01, 0x00, 0x02, 0x06]));
        assert_eq!(client.board_id().unwrap(), 0x0002);
    }

    #[test]
    fn test_rejected_reply() {
        let mut client = Client::new(Scripted::new(&[0x03, 0x02, 0x00, 0x00, 0x00, 0x05]));
        let err = client.analog_read(AnalogPin::new(0).unwrap()).unwrap_err();
        assert!(matches!(err, Error::Reply(ReplyError::Rejected)));
    }

    #[test]
    fn test_corrupted_reply() {
        let mut client = Client::new(Scripted::new(&[0x02, 0x03, 0x01, 0x07]));
        let err = client.gpio_write(d(5), false).unwrap_err();
        assert!(matches!(err, Error::Reply(ReplyError::InvalidChecksum)));
    }

    #[test]
    fn test_timeout_with_partial_reply() {
        let mut client = Client::new(Scripted::new(&[0x01, 0x02]))
            .with_reply_timeout(Some(Duration::from_millis(20)));
        let err = client.board_id().unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn test_eof_is_io_error() {
        struct Closed;
        impl Read for Closed {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Ok(0)
            }
        }
        impl Write for Closed {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = Client::new(Closed).reset().unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_i2c_argument_checks_send_nothing() {
        let mut client = Client::new(Scripted::new(&[]));
        assert!(matches!(
            client.i2c_write(0x50, 0, &[0; 9]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            client.i2c_write(0x50, 0, &[]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            client.i2c_read(0x50, 0, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(client.get_ref().sent.is_empty());
    }

    #[test]
    fn test_voltage_scaling() {
        // 512 of 1024 at 3.3 V
        let mut client = Client::new(Scripted::new(&[0x03, 0x02, 0x01, 0x02, 0x00, 0x08]))
            .with_analog_reference(3.3);
        let volts = client.analog_voltage(AnalogPin::new(2).unwrap()).unwrap();
        assert!((volts - 1.65).abs() < 1e-4);
    }
}
