//! RP2040 board support
//!
//! Pin map:
//!
//! | Board   | RP2040        |
//! |---------|---------------|
//! | D0/D1   | GPIO0/1 UART0 |
//! | D2-D13  | GPIO2-13      |
//! | A0-A3   | GPIO26-29     |
//! | A4/A5   | not wired (0) |
//! | SDA/SCL | GPIO20/21     |

use embassy_embedded_hal::SetConfig;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::gpio::{Flex, Level, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_rp::watchdog;
use embassy_time::Duration;
use embedded_hal::i2c::I2c as _;

use ioboard_core::{Board, EdgeMonitor};
use ioboard_hal::{
    AnalogInput, CounterInput, DigitalIo, I2cBus, I2cConfig, ServoOutput, SystemInfo, Watchdog,
};
use ioboard_protocol::{
    AnalogPin, CounterPin, DigitalPin, EdgeMode, GpioOptions, ServoPin, BOARD_ID,
};

use crate::channels::{with_pins, EDGES, SERVO_PULSES};
use crate::config::{ADC_SHIFT, WIRED_ANALOG_CHANNELS};

/// First GPIO of the digital pin bank
const FIRST_PIN: u8 = 2;

/// Runtime-configurable digital pins D2-D13
pub struct PinBank {
    pins: [Flex<'static>; 12],
    /// Levels seen by the previous edge sample, bit n = pin n
    last_levels: u16,
}

impl PinBank {
    pub fn new(pins: [Flex<'static>; 12]) -> Self {
        let mut bank = Self {
            pins,
            last_levels: 0,
        };
        for pin in bank.pins.iter_mut() {
            pin.set_as_input();
            pin.set_pull(Pull::None);
        }
        bank.last_levels = bank.levels();
        bank
    }

    fn flex(&mut self, pin: DigitalPin) -> &mut Flex<'static> {
        &mut self.pins[(pin.number() - FIRST_PIN) as usize]
    }

    pub fn configure(&mut self, pin: DigitalPin, options: GpioOptions) {
        let flex = self.flex(pin);
        if options.output {
            flex.set_pull(Pull::None);
            flex.set_level(Level::from(options.level));
            flex.set_as_output();
        } else {
            flex.set_as_input();
            flex.set_pull(if options.pull_up { Pull::Up } else { Pull::None });
        }
    }

    pub fn set(&mut self, pin: DigitalPin, high: bool) {
        self.flex(pin).set_level(Level::from(high));
    }

    pub fn is_high(&mut self, pin: DigitalPin) -> bool {
        self.flex(pin).is_high()
    }

    fn levels(&self) -> u16 {
        self.pins
            .iter()
            .enumerate()
            .filter(|(_, pin)| pin.is_high())
            .fold(0, |acc, (i, _)| acc | 1 << (i as u8 + FIRST_PIN))
    }

    /// Compare every pin with the previous sample and report changes
    pub fn sample(&mut self, edges: &EdgeMonitor) {
        let now = self.levels();
        let changed = now ^ self.last_levels;
        self.last_levels = now;
        if changed == 0 {
            return;
        }
        for pin in DigitalPin::all() {
            let bit = 1u16 << pin.number();
            if changed & bit != 0 {
                edges.record(pin, now & bit != 0);
            }
        }
    }
}

/// Errors of the I2C bridge
#[derive(Debug, Clone, Copy, defmt::Format)]
pub enum BusError {
    Bus(i2c::Error),
    /// The requested clock could not be set
    Config,
}

/// Peripherals the protocol engine drives
pub struct RpBoard {
    adc: Adc<'static, adc::Blocking>,
    analog: [Channel<'static>; WIRED_ANALOG_CHANNELS],
    temperature: Channel<'static>,
    i2c: I2c<'static, I2C0, i2c::Blocking>,
}

impl RpBoard {
    pub fn new(
        adc: Adc<'static, adc::Blocking>,
        analog: [Channel<'static>; WIRED_ANALOG_CHANNELS],
        temperature: Channel<'static>,
        i2c: I2c<'static, I2C0, i2c::Blocking>,
    ) -> Self {
        Self {
            adc,
            analog,
            temperature,
            i2c,
        }
    }
}

impl DigitalIo for RpBoard {
    fn configure_pin(&mut self, pin: DigitalPin, options: GpioOptions) {
        with_pins(|bank| bank.configure(pin, options));
    }

    fn write_pin(&mut self, pin: DigitalPin, high: bool) {
        with_pins(|bank| bank.set(pin, high));
    }

    fn read_pin(&mut self, pin: DigitalPin) -> bool {
        with_pins(|bank| bank.is_high(pin)).unwrap_or(false)
    }
}

impl AnalogInput for RpBoard {
    type Error = adc::Error;

    fn read_channel(&mut self, pin: AnalogPin) -> Result<u16, Self::Error> {
        match self.analog.get_mut(pin.channel() as usize) {
            Some(channel) => Ok(self.adc.blocking_read(channel)? >> ADC_SHIFT),
            None => Ok(0),
        }
    }
}

impl I2cBus for RpBoard {
    type Error = BusError;

    fn set_config(&mut self, config: I2cConfig) -> Result<(), Self::Error> {
        let mut rp_config = i2c::Config::default();
        rp_config.frequency = config.frequency;
        self.i2c.set_config(&rp_config).map_err(|_| BusError::Config)
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.i2c.write(address, data).map_err(BusError::Bus)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c
            .write_read(address, write_data, read_buf)
            .map_err(BusError::Bus)
    }
}

impl ServoOutput for RpBoard {
    fn attach_servo(&mut self, pin: ServoPin, pulse_us: u16) {
        with_pins(|bank| bank.configure(pin.digital_pin(), GpioOptions::output(false)));
        self.set_pulse(pin, pulse_us);
    }

    fn set_pulse(&mut self, pin: ServoPin, pulse_us: u16) {
        SERVO_PULSES.lock(|pulses| pulses.borrow_mut()[pin.index()] = Some(pulse_us));
    }
}

impl CounterInput for RpBoard {
    fn enable_counter(&mut self, pin: CounterPin, mode: EdgeMode) {
        defmt::debug!("Counter on D{} counting {}", pin.number(), mode);
        with_pins(|bank| bank.configure(pin.digital_pin(), GpioOptions::input(true)));
    }
}

impl SystemInfo for RpBoard {
    fn board_id(&self) -> u16 {
        BOARD_ID
    }

    fn read_die_temperature(&mut self) -> u16 {
        match self.adc.blocking_read(&mut self.temperature) {
            Ok(raw) => raw >> ADC_SHIFT,
            Err(e) => {
                defmt::warn!("Temperature conversion failed: {}", e);
                0
            }
        }
    }
}

impl Board for RpBoard {
    fn edges(&self) -> &EdgeMonitor {
        &EDGES
    }
}

/// Hardware watchdog, started by [`RpWatchdog::start`]
pub struct RpWatchdog(watchdog::Watchdog);

impl RpWatchdog {
    pub fn start(mut inner: watchdog::Watchdog, period: Duration) -> Self {
        inner.start(period);
        Self(inner)
    }
}

impl Watchdog for RpWatchdog {
    fn feed(&mut self) {
        self.0.feed();
    }
}
