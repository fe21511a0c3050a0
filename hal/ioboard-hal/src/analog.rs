//! Analog input abstractions

use ioboard_protocol::AnalogPin;

/// Analog-to-digital converter
///
/// Readings are raw converter counts. The host scales them with the
/// converter resolution and reference voltage it knows about.
pub trait AnalogInput {
    /// Error type for conversions
    type Error;

    /// Take one blocking sample of a channel
    fn read_channel(&mut self, pin: AnalogPin) -> Result<u16, Self::Error>;
}
