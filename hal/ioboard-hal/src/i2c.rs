//! I2C bridge driver
//!
//! The board is always bus master. Addresses are 7-bit and registers are
//! addressed by a one-byte offset written ahead of the data.

use ioboard_protocol::I2cSpeed;

/// Bus master used by the I2C sub-machine
pub trait I2cBus {
    /// NACK, arbitration loss, or a clock the bus cannot run at
    type Error;

    /// Reconfigure the bus clock
    fn set_config(&mut self, config: I2cConfig) -> Result<(), Self::Error>;

    /// One write transaction of `data` to `address`
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Write `write_data`, then fill `read_buf` after a repeated start
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;

    /// Read consecutive registers starting at `offset`
    fn read_registers(
        &mut self,
        address: u8,
        offset: u8,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(address, &[offset], buf)
    }
}

/// Bus clock setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// 100 kHz, the power-on clock
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

impl From<I2cSpeed> for I2cConfig {
    fn from(speed: I2cSpeed) -> Self {
        match speed {
            I2cSpeed::Standard => Self::STANDARD,
            I2cSpeed::Fast => Self::FAST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_speed() {
        assert_eq!(I2cConfig::from(I2cSpeed::Standard), I2cConfig::STANDARD);
        assert_eq!(I2cConfig::from(I2cSpeed::Fast).frequency, 400_000);
        assert_eq!(I2cConfig::default(), I2cConfig::STANDARD);
    }
}
