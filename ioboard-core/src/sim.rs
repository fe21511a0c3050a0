//! In-memory board
//!
//! `SimBoard` implements every driver trait over plain arrays so the
//! protocol engine can run on a host: in unit tests, in the host crate's
//! loopback tests, and in tools that want a device without hardware.
//!
//! The simulated I2C bus has a single register-file device. Pin level
//! changes, whether driven by the test through [`SimBoard::drive_input`]
//! or by a GPIO write, are reported to the shared [`EdgeMonitor`] the way a
//! pin-change interrupt would.

use ioboard_hal::{
    AnalogInput, CounterInput, DigitalIo, I2cBus, I2cConfig, ServoOutput, SystemInfo, Watchdog,
};
use ioboard_protocol::{
    AnalogPin, CounterPin, DigitalPin, EdgeMode, GpioOptions, ServoPin, ANALOG_CHANNELS, BOARD_ID,
};

use crate::edge::EdgeMonitor;
use crate::traits::Board;

/// Pin slots indexed by pin number; D0 and D1 are the serial port
const PIN_SLOTS: usize = 14;
const SERVO_SLOTS: usize = 8;
const COUNTER_SLOTS: usize = 2;

/// Default 7-bit address of the simulated I2C device
pub const SIM_I2C_ADDRESS: u8 = 0x50;

/// Raw die temperature reported until changed
pub const SIM_DIE_TEMPERATURE: u16 = 352;

/// Failures the simulated peripherals can report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    /// No device acknowledged the address
    Nack,
    /// The analog converter was told to fail
    Conversion,
}

/// Simulated board state
pub struct SimBoard<'a> {
    edges: &'a EdgeMonitor,
    pin_options: [Option<GpioOptions>; PIN_SLOTS],
    levels: [bool; PIN_SLOTS],
    analog: [u16; ANALOG_CHANNELS],
    analog_fault: bool,
    analog_samples: u32,
    die_temperature: u16,
    i2c_address: u8,
    i2c_registers: [u8; 256],
    i2c_config: I2cConfig,
    i2c_transactions: u32,
    servos: [Option<u16>; SERVO_SLOTS],
    counters: [Option<EdgeMode>; COUNTER_SLOTS],
}

impl<'a> SimBoard<'a> {
    pub fn new(edges: &'a EdgeMonitor) -> Self {
        Self {
            edges,
            pin_options: [None; PIN_SLOTS],
            levels: [false; PIN_SLOTS],
            analog: [0; ANALOG_CHANNELS],
            analog_fault: false,
            analog_samples: 0,
            die_temperature: SIM_DIE_TEMPERATURE,
            i2c_address: SIM_I2C_ADDRESS,
            i2c_registers: [0; 256],
            i2c_config: I2cConfig::default(),
            i2c_transactions: 0,
            servos: [None; SERVO_SLOTS],
            counters: [None; COUNTER_SLOTS],
        }
    }

    /// Change the externally applied level of a pin
    pub fn drive_input(&mut self, pin: DigitalPin, high: bool) {
        self.set_level(pin, high);
    }

    /// Apply `count` full low-high-low pulses to a pin
    pub fn pulse_input(&mut self, pin: DigitalPin, count: usize) {
        for _ in 0..count {
            self.set_level(pin, true);
            self.set_level(pin, false);
        }
    }

    pub fn level(&self, pin: DigitalPin) -> bool {
        self.levels[pin.number() as usize]
    }

    /// Configuration last applied to `pin`, if any
    pub fn pin_options(&self, pin: DigitalPin) -> Option<GpioOptions> {
        self.pin_options[pin.number() as usize]
    }

    pub fn set_analog(&mut self, pin: AnalogPin, value: u16) {
        self.analog[pin.channel() as usize] = value;
    }

    /// Make every following conversion fail (or succeed again)
    pub fn set_analog_fault(&mut self, fault: bool) {
        self.analog_fault = fault;
    }

    /// Number of conversions taken so far
    pub fn analog_samples(&self) -> u32 {
        self.analog_samples
    }

    pub fn set_die_temperature(&mut self, raw: u16) {
        self.die_temperature = raw;
    }

    /// Move the simulated I2C device to another address
    pub fn set_i2c_address(&mut self, address: u8) {
        self.i2c_address = address;
    }

    pub fn i2c_registers(&self) -> &[u8; 256] {
        &self.i2c_registers
    }

    pub fn i2c_registers_mut(&mut self) -> &mut [u8; 256] {
        &mut self.i2c_registers
    }

    pub fn i2c_config(&self) -> I2cConfig {
        self.i2c_config
    }

    /// Number of bus transactions attempted, acknowledged or not
    pub fn i2c_transactions(&self) -> u32 {
        self.i2c_transactions
    }

    /// Pulse width of an attached servo
    pub fn servo_pulse(&self, pin: ServoPin) -> Option<u16> {
        self.servos[pin.index()]
    }

    /// Edge mode a counter pin was enabled with
    pub fn counter_mode(&self, pin: CounterPin) -> Option<EdgeMode> {
        self.counters[pin.index()]
    }

    fn set_level(&mut self, pin: DigitalPin, high: bool) {
        let slot = &mut self.levels[pin.number() as usize];
        if *slot != high {
            *slot = high;
            self.edges.record(pin, high);
        }
    }

    fn check_address(&mut self, address: u8) -> Result<(), SimError> {
        self.i2c_transactions += 1;
        if address == self.i2c_address {
            Ok(())
        } else {
            Err(SimError::Nack)
        }
    }
}

impl DigitalIo for SimBoard<'_> {
    fn configure_pin(&mut self, pin: DigitalPin, options: GpioOptions) {
        self.pin_options[pin.number() as usize] = Some(options);
        if options.output {
            self.set_level(pin, options.level);
        } else if options.pull_up {
            self.set_level(pin, true);
        }
    }

    fn write_pin(&mut self, pin: DigitalPin, high: bool) {
        self.set_level(pin, high);
    }

    fn read_pin(&mut self, pin: DigitalPin) -> bool {
        self.level(pin)
    }
}

impl AnalogInput for SimBoard<'_> {
    type Error = SimError;

    fn read_channel(&mut self, pin: AnalogPin) -> Result<u16, Self::Error> {
        if self.analog_fault {
            return Err(SimError::Conversion);
        }
        self.analog_samples += 1;
        Ok(self.analog[pin.channel() as usize])
    }
}

impl I2cBus for SimBoard<'_> {
    type Error = SimError;

    fn set_config(&mut self, config: I2cConfig) -> Result<(), Self::Error> {
        self.i2c_config = config;
        Ok(())
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        self.check_address(address)?;
        if let Some((&offset, payload)) = data.split_first() {
            for (i, &byte) in payload.iter().enumerate() {
                let reg = offset.wrapping_add(i as u8);
                self.i2c_registers[reg as usize] = byte;
            }
        }
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.check_address(address)?;
        let offset = write_data.first().copied().unwrap_or(0);
        for (i, slot) in read_buf.iter_mut().enumerate() {
            let reg = offset.wrapping_add(i as u8);
            *slot = self.i2c_registers[reg as usize];
        }
        Ok(())
    }
}

impl ServoOutput for SimBoard<'_> {
    fn attach_servo(&mut self, pin: ServoPin, pulse_us: u16) {
        self.pin_options[pin.number() as usize] = Some(GpioOptions::output(false));
        self.servos[pin.index()] = Some(pulse_us);
    }

    fn set_pulse(&mut self, pin: ServoPin, pulse_us: u16) {
        self.servos[pin.index()] = Some(pulse_us);
    }
}

impl CounterInput for SimBoard<'_> {
    fn enable_counter(&mut self, pin: CounterPin, mode: EdgeMode) {
        self.counters[pin.index()] = Some(mode);
        self.configure_pin(pin.digital_pin(), GpioOptions::input(true));
    }
}

impl SystemInfo for SimBoard<'_> {
    fn board_id(&self) -> u16 {
        BOARD_ID
    }

    fn read_die_temperature(&mut self) -> u16 {
        self.die_temperature
    }
}

impl Board for SimBoard<'_> {
    fn edges(&self) -> &EdgeMonitor {
        self.edges
    }
}

/// Watchdog that only counts feeds
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimWatchdog {
    feeds: u32,
}

impl SimWatchdog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feeds(&self) -> u32 {
        self.feeds
    }
}

impl Watchdog for SimWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}
