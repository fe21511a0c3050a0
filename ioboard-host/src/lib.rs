//! Host client for the serial I/O expansion board
//!
//! The host sends one request frame, then blocks until the board's reply
//! of known length has arrived. There is never more than one request in
//! flight.
//!
//! ```no_run
//! use ioboard_host::{connect, HostConfig};
//! use ioboard_protocol::DigitalPin;
//!
//! # fn main() -> ioboard_host::Result<()> {
//! let config = HostConfig::new("/dev/ttyUSB0");
//! let mut board = connect(&config)?;
//! let led = DigitalPin::new(13).unwrap();
//! board.gpio_output(led, false)?;
//! board.gpio_write(led, true)?;
//! println!("A0 = {:.2} V", board.analog_voltage(ioboard_protocol::AnalogPin::new(0).unwrap())?);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod serial;

pub use client::Client;
pub use config::HostConfig;
pub use error::{Error, Result};
pub use serial::{connect, open_port};
