//! Class and data tags
//!
//! The first byte of every frame is a class tag selecting the subsystem,
//! the second is a data tag selecting the operation inside it. Data tag
//! values are local to their class: `2` is GPIO Read but Misc GetId.

/// Subsystem selected by the first frame byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ClassTag {
    Misc = 1,
    Gpio = 2,
    Analog = 3,
    I2c = 4,
    Servo = 5,
    Counter = 6,
}

impl ClassTag {
    /// Parse a class tag from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(ClassTag::Misc),
            2 => Some(ClassTag::Gpio),
            3 => Some(ClassTag::Analog),
            4 => Some(ClassTag::I2c),
            5 => Some(ClassTag::Servo),
            6 => Some(ClassTag::Counter),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Misc operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MiscOp {
    /// Acknowledge, then stop feeding the watchdog
    Reset = 1,
    /// Report the board identifier
    GetId = 2,
    /// Sample the on-die temperature sensor
    GetTemp = 3,
}

impl MiscOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(MiscOp::Reset),
            2 => Some(MiscOp::GetId),
            3 => Some(MiscOp::GetTemp),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// GPIO operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum GpioOp {
    Config = 1,
    Read = 2,
    Write = 3,
}

impl GpioOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(GpioOp::Config),
            2 => Some(GpioOp::Read),
            3 => Some(GpioOp::Write),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Analog operations
///
/// There is no analog Config; tag `1` is unassigned in this class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AnalogOp {
    Read = 2,
    ReadAll = 3,
}

impl AnalogOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            2 => Some(AnalogOp::Read),
            3 => Some(AnalogOp::ReadAll),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// I2C bridge operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum I2cOp {
    Config = 1,
    Read = 2,
    Write = 3,
}

impl I2cOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(I2cOp::Config),
            2 => Some(I2cOp::Read),
            3 => Some(I2cOp::Write),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Servo operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ServoOp {
    Config = 1,
    Set = 2,
}

impl ServoOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(ServoOp::Config),
            2 => Some(ServoOp::Set),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Edge counter operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CounterOp {
    Config = 1,
    Read = 2,
}

impl CounterOp {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(CounterOp::Config),
            2 => Some(CounterOp::Read),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Reply status, always the first payload byte of a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Status {
    Nok = 0,
    Ok = 1,
}

impl Status {
    /// `Ok` when `success` holds, `Nok` otherwise
    pub fn from_success(success: bool) -> Self {
        if success {
            Status::Ok
        } else {
            Status::Nok
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tag_values() {
        assert_eq!(ClassTag::Misc.to_byte(), 1);
        assert_eq!(ClassTag::Gpio.to_byte(), 2);
        assert_eq!(ClassTag::Analog.to_byte(), 3);
        assert_eq!(ClassTag::I2c.to_byte(), 4);
        assert_eq!(ClassTag::Servo.to_byte(), 5);
        assert_eq!(ClassTag::Counter.to_byte(), 6);
    }

    #[test]
    fn test_class_tag_parse() {
        for byte in 1..=6 {
            let tag = ClassTag::from_byte(byte).unwrap();
            assert_eq!(tag.to_byte(), byte);
        }
        assert_eq!(ClassTag::from_byte(0), None);
        assert_eq!(ClassTag::from_byte(7), None);
        assert_eq!(ClassTag::from_byte(0xFF), None);
    }

    #[test]
    fn test_data_tags_are_class_local() {
        assert_eq!(MiscOp::from_byte(2), Some(MiscOp::GetId));
        assert_eq!(GpioOp::from_byte(2), Some(GpioOp::Read));
        assert_eq!(AnalogOp::from_byte(2), Some(AnalogOp::Read));
        assert_eq!(ServoOp::from_byte(2), Some(ServoOp::Set));
        assert_eq!(CounterOp::from_byte(2), Some(CounterOp::Read));
    }

    #[test]
    fn test_unassigned_data_tags() {
        assert_eq!(AnalogOp::from_byte(1), None);
        assert_eq!(MiscOp::from_byte(4), None);
        assert_eq!(ServoOp::from_byte(3), None);
        assert_eq!(CounterOp::from_byte(0), None);
        assert_eq!(I2cOp::from_byte(4), None);
    }

    #[test]
    fn test_status() {
        assert_eq!(Status::Ok.to_byte(), 1);
        assert_eq!(Status::Nok.to_byte(), 0);
        assert_eq!(Status::from_success(true), Status::Ok);
        assert!(!Status::from_success(false).is_ok());
    }
}
