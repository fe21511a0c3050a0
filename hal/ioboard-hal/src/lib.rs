//! I/O Board Hardware Abstraction Layer
//!
//! This crate defines the driver interfaces the protocol engine calls when a
//! command has been decoded and validated. Chip support implements them;
//! the engine never touches registers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ioboard-core (parser, device loop)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ioboard-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ ioboard-      │       │ SimBoard      │
//! │ firmware      │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::DigitalIo`] - Digital pins D2–D13
//! - [`analog::AnalogInput`] - Analog channels A0–A5
//! - [`i2c::I2cBus`] - I2C bus master
//! - [`servo::ServoOutput`] - Servo pulse outputs
//! - [`counter::CounterInput`] - Edge counter inputs
//! - [`system::SystemInfo`], [`system::Watchdog`] - Board identity and supervision
//!
//! Pin arguments are the validated pin types from `ioboard-protocol`, so
//! implementations never see an out-of-range pin.

#![no_std]
#![deny(unsafe_code)]

pub mod analog;
pub mod counter;
pub mod gpio;
pub mod i2c;
pub mod servo;
pub mod system;
pub mod uart;

// Trait re-exports
pub use analog::AnalogInput;
pub use counter::CounterInput;
pub use gpio::DigitalIo;
pub use i2c::{I2cBus, I2cConfig};
pub use servo::ServoOutput;
pub use system::{SystemInfo, Watchdog};
pub use uart::UartConfig;
