//! Client against the real protocol engine
//!
//! The link pushes host bytes into the device's receive ring, runs one
//! main-loop pass, and hands back whatever landed in the transmit ring.

use std::io::{self, Read, Write};
use std::time::Duration;

use ioboard_core::sim::{SimBoard, SimWatchdog, SIM_I2C_ADDRESS};
use ioboard_core::{Device, DeviceState, EdgeMonitor, SharedRing};
use ioboard_host::{Client, Error};
use ioboard_protocol::{
    AnalogPin, CounterPin, DigitalPin, EdgeMode, I2cSpeed, ReplyError, ServoPin, BOARD_ID,
};

const RX: usize = 256;
const TX: usize = 512;

struct SimLink<'a> {
    device: Device<'a, SimBoard<'a>, SimWatchdog, RX, TX>,
    rx: &'a SharedRing<RX>,
    tx: &'a SharedRing<TX>,
}

impl Read for SimLink<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.tx.pop() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        if n == 0 {
            Err(io::ErrorKind::TimedOut.into())
        } else {
            Ok(n)
        }
    }
}

impl Write for SimLink<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            if !self.rx.push(byte) {
                self.device.poll();
                self.rx.push(byte);
            }
        }
        self.device.poll();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn d(n: u8) -> DigitalPin {
    DigitalPin::new(n).unwrap()
}

macro_rules! bench {
    ($client:ident) => {
        init_logging();
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<RX>::new();
        let tx = SharedRing::<TX>::new();
        let link = SimLink {
            device: Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx),
            rx: &rx,
            tx: &tx,
        };
        #[allow(unused_mut)]
        let mut $client = Client::new(link).with_reply_timeout(Some(Duration::from_millis(200)));
    };
}

#[test]
fn test_identity() {
    bench!(client);
    assert_eq!(client.board_id().unwrap(), BOARD_ID);
    assert!(client.temperature_raw().unwrap() > 0);
    assert!(client.temperature().unwrap() > 0.0);
}

#[test]
fn test_gpio_round_trip() {
    bench!(client);

    client.gpio_output(d(13), false).unwrap();
    client.gpio_write(d(13), true).unwrap();
    assert!(client.get_ref().device.board().level(d(13)));

    let sample = client.gpio_read(d(13)).unwrap();
    assert!(sample.high);
    assert!(sample.rose);
    assert!(!sample.fell);

    let sample = client.gpio_read(d(13)).unwrap();
    assert!(sample.high);
    assert!(!sample.rose);
}

#[test]
fn test_gpio_input_edges() {
    bench!(client);

    client.gpio_input(d(7), false).unwrap();
    client.get_mut().device.board_mut().pulse_input(d(7), 2);

    let sample = client.gpio_read(d(7)).unwrap();
    assert!(!sample.high);
    assert!(sample.rose);
    assert!(sample.fell);
}

#[test]
fn test_analog() {
    bench!(client);
    {
        let board = client.get_mut().device.board_mut();
        board.set_analog(AnalogPin::new(0).unwrap(), 1023);
        board.set_analog(AnalogPin::new(5).unwrap(), 256);
    }

    assert_eq!(client.analog_read(AnalogPin::new(0).unwrap()).unwrap(), 1023);
    let volts = client.analog_voltage(AnalogPin::new(5).unwrap()).unwrap();
    assert!((volts - 1.25).abs() < 1e-4);

    let all = client.analog_read_all().unwrap();
    assert_eq!(all, [1023, 0, 0, 0, 0, 256]);

    let volts = client.analog_voltages().unwrap();
    assert!((volts[5] - 1.25).abs() < 1e-4);
}

#[test]
fn test_i2c() {
    bench!(client);

    client.i2c_config(I2cSpeed::Fast).unwrap();
    client
        .i2c_write(SIM_I2C_ADDRESS, 0x40, &[1, 2, 3, 4, 5, 6, 7, 8])
        .unwrap();
    assert_eq!(
        client.i2c_read(SIM_I2C_ADDRESS, 0x42, 4).unwrap(),
        vec![3, 4, 5, 6]
    );

    let err = client.i2c_read(0x21, 0, 2).unwrap_err();
    assert!(matches!(err, Error::Reply(ReplyError::Rejected)));

    // Still in step after a rejected read
    assert_eq!(client.board_id().unwrap(), BOARD_ID);
}

#[test]
fn test_i2c_read_over_capacity() {
    bench!(client);
    let err = client.i2c_read(SIM_I2C_ADDRESS, 0, 64).unwrap_err();
    assert!(matches!(err, Error::Reply(ReplyError::Rejected)));
    assert_eq!(client.get_ref().device.board().i2c_transactions(), 0);
}

#[test]
fn test_servo() {
    bench!(client);

    client.servo_config(ServoPin::D10, 1200).unwrap();
    client.servo_set(ServoPin::D10, 3000).unwrap();
    assert_eq!(
        client.get_ref().device.board().servo_pulse(ServoPin::D10),
        Some(2000)
    );
}

#[test]
fn test_counter() {
    bench!(client);

    client.counter_config(CounterPin::D3, EdgeMode::Falling).unwrap();
    client.get_mut().device.board_mut().pulse_input(d(3), 7);

    assert_eq!(client.counter_read(CounterPin::D3).unwrap(), 7);
    assert_eq!(client.counter_read(CounterPin::D3).unwrap(), 0);
}

#[test]
fn test_reset_then_silence() {
    bench!(client);

    client.reset().unwrap();
    assert_eq!(client.get_ref().device.state(), DeviceState::Halted);

    // Nothing answers until the watchdog has restarted the board
    let err = client.board_id().unwrap_err();
    assert!(matches!(err, Error::Timeout(_)));
}
