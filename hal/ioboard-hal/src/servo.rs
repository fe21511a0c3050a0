//! Servo output abstractions

use ioboard_protocol::ServoPin;

/// Servo pulse generator
///
/// Pulse widths arrive already clamped to 1000–2000 µs. The generator
/// repeats each pulse once per 20 ms frame.
pub trait ServoOutput {
    /// Make `pin` a servo output starting at `pulse_us`
    fn attach_servo(&mut self, pin: ServoPin, pulse_us: u16);

    /// Change the pulse width of a servo output
    fn set_pulse(&mut self, pin: ServoPin, pulse_us: u16);
}
