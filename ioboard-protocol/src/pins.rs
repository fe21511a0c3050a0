//! Pin identifiers
//!
//! Each subsystem accepts a different set of board pins. These types can
//! only be built from an in-range pin number, so a value that reaches a
//! driver has already passed range validation.

/// Digital pin usable for GPIO (D2–D13)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitalPin(u8);

impl DigitalPin {
    /// Lowest GPIO pin number (D0/D1 carry the serial link)
    pub const MIN: u8 = 2;
    /// Highest GPIO pin number
    pub const MAX: u8 = 13;

    pub const fn new(number: u8) -> Option<Self> {
        if number >= Self::MIN && number <= Self::MAX {
            Some(Self(number))
        } else {
            None
        }
    }

    /// Board pin number
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Iterate over every GPIO pin in ascending order
    pub fn all() -> impl Iterator<Item = DigitalPin> {
        (Self::MIN..=Self::MAX).map(DigitalPin)
    }
}

/// Analog input channel (A0–A5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogPin(u8);

impl AnalogPin {
    pub const MAX: u8 = 5;

    /// All channels in the order ReadAll reports them
    pub const ALL: [AnalogPin; 6] = [
        AnalogPin(0),
        AnalogPin(1),
        AnalogPin(2),
        AnalogPin(3),
        AnalogPin(4),
        AnalogPin(5),
    ];

    pub const fn new(channel: u8) -> Option<Self> {
        if channel <= Self::MAX {
            Some(Self(channel))
        } else {
            None
        }
    }

    pub const fn channel(self) -> u8 {
        self.0
    }
}

/// Pin that can drive a servo
///
/// D9 and D10 sit on the hardware PWM timer; the others are driven by a
/// software pulse generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoPin {
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D9,
    D10,
}

impl ServoPin {
    pub const ALL: [ServoPin; 8] = [
        ServoPin::D2,
        ServoPin::D3,
        ServoPin::D4,
        ServoPin::D5,
        ServoPin::D6,
        ServoPin::D7,
        ServoPin::D9,
        ServoPin::D10,
    ];

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            2 => Some(ServoPin::D2),
            3 => Some(ServoPin::D3),
            4 => Some(ServoPin::D4),
            5 => Some(ServoPin::D5),
            6 => Some(ServoPin::D6),
            7 => Some(ServoPin::D7),
            9 => Some(ServoPin::D9),
            10 => Some(ServoPin::D10),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            ServoPin::D2 => 2,
            ServoPin::D3 => 3,
            ServoPin::D4 => 4,
            ServoPin::D5 => 5,
            ServoPin::D6 => 6,
            ServoPin::D7 => 7,
            ServoPin::D9 => 9,
            ServoPin::D10 => 10,
        }
    }

    /// Slot in an eight-entry servo table
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns true for pins on the hardware PWM timer
    pub fn is_hardware(self) -> bool {
        matches!(self, ServoPin::D9 | ServoPin::D10)
    }

    /// The digital pin this servo output occupies
    pub fn digital_pin(self) -> DigitalPin {
        DigitalPin(self.number())
    }
}

/// Pin wired to an external-interrupt edge counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterPin {
    D2,
    D3,
}

impl CounterPin {
    pub const ALL: [CounterPin; 2] = [CounterPin::D2, CounterPin::D3];

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            2 => Some(CounterPin::D2),
            3 => Some(CounterPin::D3),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            CounterPin::D2 => 2,
            CounterPin::D3 => 3,
        }
    }

    /// Slot in a two-entry counter table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn digital_pin(self) -> DigitalPin {
        DigitalPin(self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digital_pin_bounds() {
        assert_eq!(DigitalPin::new(1), None);
        assert_eq!(DigitalPin::new(2).map(DigitalPin::number), Some(2));
        assert_eq!(DigitalPin::new(13).map(DigitalPin::number), Some(13));
        assert_eq!(DigitalPin::new(14), None);
        assert_eq!(DigitalPin::all().count(), 12);
    }

    #[test]
    fn test_analog_pin_bounds() {
        assert!(AnalogPin::new(0).is_some());
        assert!(AnalogPin::new(5).is_some());
        assert!(AnalogPin::new(6).is_none());
        for (i, pin) in AnalogPin::ALL.iter().enumerate() {
            assert_eq!(pin.channel() as usize, i);
        }
    }

    #[test]
    fn test_servo_pins() {
        assert_eq!(ServoPin::from_number(8), None);
        assert_eq!(ServoPin::from_number(11), None);
        assert_eq!(ServoPin::from_number(1), None);
        for pin in ServoPin::ALL {
            assert_eq!(ServoPin::from_number(pin.number()), Some(pin));
        }
        assert!(ServoPin::D9.is_hardware());
        assert!(ServoPin::D10.is_hardware());
        assert!(!ServoPin::D7.is_hardware());
        assert_eq!(ServoPin::D10.index(), 7);
    }

    #[test]
    fn test_counter_pins() {
        assert_eq!(CounterPin::from_number(2), Some(CounterPin::D2));
        assert_eq!(CounterPin::from_number(3), Some(CounterPin::D3));
        assert_eq!(CounterPin::from_number(4), None);
        assert_eq!(CounterPin::D3.index(), 1);
        assert_eq!(CounterPin::D3.digital_pin().number(), 3);
    }
}
