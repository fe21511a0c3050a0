//! Option bytes and small packed values carried in frames

/// GPIO configuration option bits
const GPIO_OPT_OUTPUT: u8 = 0x01;
const GPIO_OPT_LEVEL: u8 = 0x02;
const GPIO_OPT_PULL_UP: u8 = 0x04;

/// Counter edge option bits
const EDGE_OPT_RISING: u8 = 0x01;
const EDGE_OPT_FALLING: u8 = 0x02;
const EDGE_OPT_BOTH: u8 = 0x04;

/// Shortest servo pulse in microseconds
pub const SERVO_PULSE_MIN_US: u16 = 1000;
/// Longest servo pulse in microseconds
pub const SERVO_PULSE_MAX_US: u16 = 2000;
/// Servo frame period in microseconds
pub const SERVO_PERIOD_US: u32 = 20_000;

/// Clamp a servo pulse width into the valid range
pub fn clamp_pulse(pulse_us: u16) -> u16 {
    pulse_us.clamp(SERVO_PULSE_MIN_US, SERVO_PULSE_MAX_US)
}

/// GPIO pin configuration decoded from the Config option byte
///
/// Unused bits are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioOptions {
    /// Drive the pin (true) or sample it (false)
    pub output: bool,
    /// Initial level for outputs
    pub level: bool,
    /// Enable the internal pull-up (inputs)
    pub pull_up: bool,
}

impl GpioOptions {
    /// Input with optional pull-up
    pub fn input(pull_up: bool) -> Self {
        Self {
            output: false,
            level: false,
            pull_up,
        }
    }

    /// Output starting at `level`
    pub fn output(level: bool) -> Self {
        Self {
            output: true,
            level,
            pull_up: false,
        }
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            output: byte & GPIO_OPT_OUTPUT != 0,
            level: byte & GPIO_OPT_LEVEL != 0,
            pull_up: byte & GPIO_OPT_PULL_UP != 0,
        }
    }

    pub fn to_byte(self) -> u8 {
        let mut byte = 0;
        if self.output {
            byte |= GPIO_OPT_OUTPUT;
        }
        if self.level {
            byte |= GPIO_OPT_LEVEL;
        }
        if self.pull_up {
            byte |= GPIO_OPT_PULL_UP;
        }
        byte
    }
}

/// Which edges an edge counter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeMode {
    Rising,
    Falling,
    Both,
}

impl EdgeMode {
    /// Decode the counter option byte
    ///
    /// Bits are tested in the order rising, falling, both; the first one set
    /// wins. Returns `None` when none of them is set.
    pub fn from_options(byte: u8) -> Option<Self> {
        if byte & EDGE_OPT_RISING != 0 {
            Some(EdgeMode::Rising)
        } else if byte & EDGE_OPT_FALLING != 0 {
            Some(EdgeMode::Falling)
        } else if byte & EDGE_OPT_BOTH != 0 {
            Some(EdgeMode::Both)
        } else {
            None
        }
    }

    pub fn to_options(self) -> u8 {
        match self {
            EdgeMode::Rising => EDGE_OPT_RISING,
            EdgeMode::Falling => EDGE_OPT_FALLING,
            EdgeMode::Both => EDGE_OPT_BOTH,
        }
    }

    /// Returns true if an edge in the given direction should be counted
    pub fn accepts(self, rising: bool) -> bool {
        match self {
            EdgeMode::Rising => rising,
            EdgeMode::Falling => !rising,
            EdgeMode::Both => true,
        }
    }
}

/// I2C bus clock selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cSpeed {
    /// 100 kHz
    Standard,
    /// 400 kHz
    Fast,
}

impl I2cSpeed {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(I2cSpeed::Standard),
            1 => Some(I2cSpeed::Fast),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            I2cSpeed::Standard => 0,
            I2cSpeed::Fast => 1,
        }
    }

    /// Bus clock in Hz
    pub fn frequency(self) -> u32 {
        match self {
            I2cSpeed::Standard => 100_000,
            I2cSpeed::Fast => 400_000,
        }
    }
}

/// Result of a GPIO Read: current level plus the edges seen since the
/// previous read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinSample {
    pub high: bool,
    pub rose: bool,
    pub fell: bool,
}

impl PinSample {
    /// Pack as bit0 level, bit1 rising edge, bit2 falling edge
    pub fn to_byte(self) -> u8 {
        (self.high as u8) | ((self.rose as u8) << 1) | ((self.fell as u8) << 2)
    }

    pub fn from_byte(byte: u8) -> Self {
        Self {
            high: byte & 0x01 != 0,
            rose: byte & 0x02 != 0,
            fell: byte & 0x04 != 0,
        }
    }
}
