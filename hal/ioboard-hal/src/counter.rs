//! Edge counter inputs

use ioboard_protocol::{CounterPin, EdgeMode};

/// Hardware side of an edge counter
///
/// Arming makes the pin a pulled-up input and enables its edge source.
/// The counting itself happens outside the driver, in whatever context
/// observes the edges.
pub trait CounterInput {
    fn enable_counter(&mut self, pin: CounterPin, mode: EdgeMode);
}
