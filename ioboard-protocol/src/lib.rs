//! Serial I/O Expansion Board Protocol
//!
//! This crate defines the byte-level protocol spoken between a host computer
//! and the I/O expansion board. The host sends one request frame and waits
//! for exactly one reply frame before sending the next.
//!
//! # Protocol Overview
//!
//! Requests and replies share one frame layout:
//! ```text
//! ┌───────────┬──────────┬─────────────┬──────────┐
//! │ CLASS TAG │ DATA TAG │ PAYLOAD     │ CHECKSUM │
//! │ 1B        │ 1B       │ 0–258B      │ 1B       │
//! └───────────┴──────────┴─────────────┴──────────┘
//! ```
//!
//! The checksum is the sum of every preceding byte, modulo 256. A reply
//! echoes the request's tags and its payload always starts with a status
//! byte (OK = 1, NOK = 0). Multi-byte fields are big-endian.
//!
//! There is no start byte and no escaping. A receiver that loses a byte in
//! the middle of a frame stays out of step until the next Reset.

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "std")]
extern crate std;

pub mod frame;
pub mod options;
pub mod pins;
pub mod reply;
pub mod request;
pub mod tags;

pub use frame::{checksum, verify, ByteSink, Checksum, Frame, FrameError, ReplyWriter};
pub use options::{
    clamp_pulse, EdgeMode, GpioOptions, I2cSpeed, PinSample, SERVO_PERIOD_US, SERVO_PULSE_MAX_US,
    SERVO_PULSE_MIN_US,
};
pub use pins::{AnalogPin, CounterPin, DigitalPin, ServoPin};
pub use reply::{Reply, ReplyError};
pub use request::Request;
pub use tags::{AnalogOp, ClassTag, CounterOp, GpioOp, I2cOp, MiscOp, ServoOp, Status};

/// Identifier reported by the Misc/GetId command
pub const BOARD_ID: u16 = 0x0002;

/// Largest I2C read the board serves in one request
pub const I2C_READ_CAPACITY: usize = 32;

/// Largest I2C write the board accepts in one request
pub const I2C_WRITE_CAPACITY: usize = 8;

/// Number of analog input channels
pub const ANALOG_CHANNELS: usize = 6;
