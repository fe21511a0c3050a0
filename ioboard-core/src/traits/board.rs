//! Board abstraction
//!
//! A board is the full set of peripheral drivers plus the edge state shared
//! with its edge source. The parser is generic over this one trait so a
//! firmware board and the simulator plug in the same way.

use ioboard_hal::{AnalogInput, CounterInput, DigitalIo, I2cBus, ServoOutput, SystemInfo};

use crate::edge::EdgeMonitor;

/// Everything a command handler may touch
pub trait Board:
    DigitalIo + AnalogInput + I2cBus + ServoOutput + CounterInput + SystemInfo
{
    /// Edge flags and counters fed by the board's edge source
    fn edges(&self) -> &EdgeMonitor;
}
