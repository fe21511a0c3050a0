//! Edge flags and edge counters
//!
//! These cells are written by whatever observes pin changes (a pin-change
//! interrupt, a sampling task, a simulator thread) and read by the parser.
//! All parser-side reads are atomic read-and-clear swaps, so an edge that
//! lands during a read is either reported now or kept for the next read.

use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use ioboard_protocol::{CounterPin, DigitalPin, EdgeMode};

/// Fall flags live in the upper half of the edge word
const FALL_SHIFT: u32 = 16;

/// Stored counter mode values
const MODE_OFF: u8 = 0;
const MODE_RISING: u8 = 1;
const MODE_FALLING: u8 = 2;
const MODE_BOTH: u8 = 3;

/// Edges seen on one pin since the previous read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Edges {
    pub rose: bool,
    pub fell: bool,
}

/// Interrupt-shared edge state for the whole board
pub struct EdgeMonitor {
    /// Bit n: rising edge on pin n; bit 16+n: falling edge on pin n
    edges: AtomicU32,
    counter_modes: [AtomicU8; 2],
    counts: [AtomicU8; 2],
}

impl Default for EdgeMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeMonitor {
    pub const fn new() -> Self {
        Self {
            edges: AtomicU32::new(0),
            counter_modes: [AtomicU8::new(MODE_OFF), AtomicU8::new(MODE_OFF)],
            counts: [AtomicU8::new(0), AtomicU8::new(0)],
        }
    }

    /// Record a level change on `pin`
    ///
    /// Sets the pin's rise or fall flag and, if the pin is an armed counter
    /// whose mode accepts this edge, bumps its count. Counts wrap at 256.
    pub fn record(&self, pin: DigitalPin, rising: bool) {
        let bit = 1u32 << pin.number();
        let flag = if rising { bit } else { bit << FALL_SHIFT };
        self.edges.fetch_or(flag, Ordering::AcqRel);

        if let Some(counter) = CounterPin::from_number(pin.number()) {
            let idx = counter.index();
            let counts = decode_mode(self.counter_modes[idx].load(Ordering::Acquire))
                .is_some_and(|mode| mode.accepts(rising));
            if counts {
                self.counts[idx].fetch_add(1, Ordering::AcqRel);
            }
        }
    }

    /// Read and clear both edge flags of `pin`
    pub fn take_edges(&self, pin: DigitalPin) -> Edges {
        let bit = 1u32 << pin.number();
        let fall_bit = bit << FALL_SHIFT;
        let previous = self.edges.fetch_and(!(bit | fall_bit), Ordering::AcqRel);
        Edges {
            rose: previous & bit != 0,
            fell: previous & fall_bit != 0,
        }
    }

    /// Start counting `mode` edges on `pin` from zero
    pub fn arm_counter(&self, pin: CounterPin, mode: EdgeMode) {
        let idx = pin.index();
        self.counter_modes[idx].store(encode_mode(mode), Ordering::Release);
        self.counts[idx].swap(0, Ordering::AcqRel);
    }

    /// Mode the counter on `pin` was armed with, if any
    pub fn counter_mode(&self, pin: CounterPin) -> Option<EdgeMode> {
        decode_mode(self.counter_modes[pin.index()].load(Ordering::Acquire))
    }

    /// Read and clear the count of `pin`
    pub fn take_count(&self, pin: CounterPin) -> u8 {
        self.counts[pin.index()].swap(0, Ordering::AcqRel)
    }
}

fn encode_mode(mode: EdgeMode) -> u8 {
    match mode {
        EdgeMode::Rising => MODE_RISING,
        EdgeMode::Falling => MODE_FALLING,
        EdgeMode::Both => MODE_BOTH,
    }
}

fn decode_mode(raw: u8) -> Option<EdgeMode> {
    match raw {
        MODE_RISING => Some(EdgeMode::Rising),
        MODE_FALLING => Some(EdgeMode::Falling),
        MODE_BOTH => Some(EdgeMode::Both),
        _ => None,
    }
}
