//! GPIO pin abstractions
//!
//! The board exposes D2–D13 as general purpose pins whose direction can
//! change at runtime, so the driver is a port over all of them rather than
//! one type per pin.

use ioboard_protocol::{DigitalPin, GpioOptions};

/// Bank of runtime-configurable digital pins
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait DigitalIo {
    /// Apply direction, initial level and pull-up to a pin
    ///
    /// For outputs the pin is driven to `options.level` immediately.
    fn configure_pin(&mut self, pin: DigitalPin, options: GpioOptions);

    /// Drive an output pin high or low
    fn write_pin(&mut self, pin: DigitalPin, high: bool);

    /// Sample the current level of a pin
    fn read_pin(&mut self, pin: DigitalPin) -> bool;
}
