//! Board-agnostic protocol engine for the I/O expansion board
//!
//! This crate contains everything between the serial bytes and the
//! peripheral drivers that does not depend on a specific chip:
//!
//! - Ring buffers for the receive and transmit byte streams
//! - Edge flags and counters shared with the edge sampling context
//! - The two-level protocol state machine
//! - The main-loop step that ties them to a board and its watchdog
//! - A simulated board for host-side use (`sim` feature)
//!
//! No allocation happens anywhere in this crate; every buffer has a fixed
//! capacity chosen at compile time.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod device;
pub mod edge;
pub mod parser;
pub mod traits;
pub mod transport;

#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use device::{Device, DeviceState};
pub use edge::{EdgeMonitor, Edges};
pub use parser::{Outcome, Parser, ParserState};
pub use traits::Board;
pub use transport::{RingBuffer, SharedRing};
