//! Protocol state machine
//!
//! A two-level decoder fed one byte at a time. The top level waits for a
//! class tag and then hands every following byte to that class's
//! sub-machine until the sub-machine has seen the checksum and written a
//! reply. Each sub-machine begins with a data tag step that picks the
//! operation, collects the operation's fields, then checks the checksum
//! and arguments before touching hardware.
//!
//! ```text
//!                  known class tag
//!  AwaitingClassTag ───────────────▶ In<Class>(AwaitingDataTag)
//!        ▲   │ unknown: discard            │ fields...
//!        │   └──────┘                      ▼
//!        └──────────────────────── checksum byte: reply OK / NOK
//! ```
//!
//! Unknown class tags and unknown data tags are discarded without a reply
//! and without leaving the current step. A lost byte inside a frame is not
//! detected; the parser returns to `AwaitingClassTag` one frame length
//! later and whatever follows is read as a new frame.

mod analog;
mod counter;
mod gpio;
mod i2c;
mod misc;
mod servo;

use heapless::Vec;
use ioboard_protocol::{
    ByteSink, Checksum, ClassTag, ReplyWriter, Status, I2C_WRITE_CAPACITY,
};

use crate::traits::Board;

pub use analog::AnalogState;
pub use counter::CounterState;
pub use gpio::GpioState;
pub use i2c::I2cState;
pub use misc::MiscState;
pub use servo::ServoState;

/// Position of the decoder within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParserState {
    /// Between frames
    AwaitingClassTag,
    InMisc(MiscState),
    InGpio(GpioState),
    InAnalog(AnalogState),
    InI2c(I2cState),
    InServo(ServoState),
    InCounter(CounterState),
}

impl ParserState {
    /// State right after `class` has been accepted
    fn enter(class: ClassTag) -> Self {
        match class {
            ClassTag::Misc => ParserState::InMisc(MiscState::AwaitingDataTag),
            ClassTag::Gpio => ParserState::InGpio(GpioState::AwaitingDataTag),
            ClassTag::Analog => ParserState::InAnalog(AnalogState::AwaitingDataTag),
            ClassTag::I2c => ParserState::InI2c(I2cState::AwaitingDataTag),
            ClassTag::Servo => ParserState::InServo(ServoState::AwaitingDataTag),
            ClassTag::Counter => ParserState::InCounter(CounterState::AwaitingDataTag),
        }
    }
}

/// What a single fed byte did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Byte accepted; the frame is not complete yet
    Pending,
    /// Byte was not a recognised tag and was dropped
    Discarded,
    /// Frame complete and one reply written
    Completed { class: ClassTag, status: Status },
    /// A valid Reset was acknowledged; the caller must stop feeding the
    /// watchdog
    ResetRequested,
}

/// Result of one sub-machine step
pub(crate) enum Step<S> {
    /// Byte belongs to the frame, continue in the given sub-state
    Next(S),
    /// Byte is not a known data tag, stay in the current sub-state
    Discard,
    /// Checksum step done, reply written
    Done(Status),
    /// Reset acknowledged
    Reset,
}

impl<S> Step<S> {
    fn map<T>(self, f: impl FnOnce(S) -> T) -> Step<T> {
        match self {
            Step::Next(s) => Step::Next(f(s)),
            Step::Discard => Step::Discard,
            Step::Done(status) => Step::Done(status),
            Step::Reset => Step::Reset,
        }
    }
}

/// Borrowed resources handed to a sub-machine for one byte
pub(crate) struct Context<'a, B: Board, S: ByteSink + ?Sized> {
    pub board: &'a mut B,
    sink: &'a mut S,
    /// Sum of every accepted byte of the current frame
    sum: Checksum,
    /// I2C write payload accumulator
    pub i2c_data: &'a mut Vec<u8, I2C_WRITE_CAPACITY>,
}

impl<B: Board, S: ByteSink + ?Sized> Context<'_, B, S> {
    /// Returns true if `byte` is the checksum of the frame so far
    pub fn checksum_ok(&self, byte: u8) -> bool {
        self.sum.matches(byte)
    }

    /// Start the reply frame for `class`/`data`
    pub fn reply(&mut self, class: ClassTag, data: u8, status: Status) -> ReplyWriter<'_, S> {
        ReplyWriter::begin(&mut *self.sink, class.to_byte(), data, status)
    }
}

/// Incremental request decoder
///
/// One instance lives for the whole uptime of the device. It never
/// allocates and never blocks.
#[derive(Debug, Clone)]
pub struct Parser {
    state: ParserState,
    sum: Checksum,
    i2c_data: Vec<u8, I2C_WRITE_CAPACITY>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub const fn new() -> Self {
        Self {
            state: ParserState::AwaitingClassTag,
            sum: Checksum::new(),
            i2c_data: Vec::new(),
        }
    }

    /// Current decoder position
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Drop any partial frame
    pub fn reset(&mut self) {
        self.state = ParserState::AwaitingClassTag;
        self.sum = Checksum::new();
        self.i2c_data.clear();
    }

    /// Feed one received byte
    ///
    /// Runs the command and writes its reply to `sink` when `byte`
    /// completes a frame.
    pub fn feed<B, S>(&mut self, byte: u8, board: &mut B, sink: &mut S) -> Outcome
    where
        B: Board,
        S: ByteSink + ?Sized,
    {
        let mut ctx = Context {
            board,
            sink,
            sum: self.sum,
            i2c_data: &mut self.i2c_data,
        };

        let (class, step) = match self.state {
            ParserState::AwaitingClassTag => {
                return match ClassTag::from_byte(byte) {
                    Some(class) => {
                        self.sum = Checksum::new();
                        self.sum.update(byte);
                        self.state = ParserState::enter(class);
                        Outcome::Pending
                    }
                    None => Outcome::Discarded,
                };
            }
            ParserState::InMisc(s) => (
                ClassTag::Misc,
                misc::feed(s, byte, &mut ctx).map(ParserState::InMisc),
            ),
            ParserState::InGpio(s) => (
                ClassTag::Gpio,
                gpio::feed(s, byte, &mut ctx).map(ParserState::InGpio),
            ),
            ParserState::InAnalog(s) => (
                ClassTag::Analog,
                analog::feed(s, byte, &mut ctx).map(ParserState::InAnalog),
            ),
            ParserState::InI2c(s) => (
                ClassTag::I2c,
                i2c::feed(s, byte, &mut ctx).map(ParserState::InI2c),
            ),
            ParserState::InServo(s) => (
                ClassTag::Servo,
                servo::feed(s, byte, &mut ctx).map(ParserState::InServo),
            ),
            ParserState::InCounter(s) => (
                ClassTag::Counter,
                counter::feed(s, byte, &mut ctx).map(ParserState::InCounter),
            ),
        };

        match step {
            Step::Next(next) => {
                self.sum.update(byte);
                self.state = next;
                Outcome::Pending
            }
            Step::Discard => Outcome::Discarded,
            Step::Done(status) => {
                self.reset();
                Outcome::Completed { class, status }
            }
            Step::Reset => {
                self.reset();
                Outcome::ResetRequested
            }
        }
    }

    /// Feed a run of bytes, returning the outcome of the last one
    pub fn feed_bytes<B, S>(&mut self, bytes: &[u8], board: &mut B, sink: &mut S) -> Outcome
    where
        B: Board,
        S: ByteSink + ?Sized,
    {
        let mut outcome = Outcome::Pending;
        for &byte in bytes {
            outcome = self.feed(byte, board, sink);
        }
        outcome
    }
}
