//! State shared between tasks
//!
//! The rings and the edge monitor are the same types the protocol engine
//! uses on the host; here they live in statics so the UART tasks, the
//! sampler and the main loop can all reach them.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use ioboard_core::{EdgeMonitor, SharedRing};

use crate::board::PinBank;
use crate::config::{RX_RING_SIZE, TX_RING_SIZE};

/// Bytes received from the host, drained by the main loop
pub static RX_RING: SharedRing<RX_RING_SIZE> = SharedRing::new();

/// Reply bytes waiting to go out
pub static TX_RING: SharedRing<TX_RING_SIZE> = SharedRing::new();

/// Edge flags and counters, written by the sampler task
pub static EDGES: EdgeMonitor = EdgeMonitor::new();

/// Signal that bytes were pushed to `RX_RING`
pub static RX_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Signal that bytes were pushed to `TX_RING`
pub static TX_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Digital pins D2-D13, installed once at boot
pub static PINS: Mutex<CriticalSectionRawMutex, RefCell<Option<PinBank>>> =
    Mutex::new(RefCell::new(None));

/// Servo pulse widths in µs by `ServoPin::index`; `None` when detached
pub static SERVO_PULSES: Mutex<CriticalSectionRawMutex, RefCell<[Option<u16>; 8]>> =
    Mutex::new(RefCell::new([None; 8]));

/// Run `f` on the pin bank inside a critical section
///
/// Returns `None` before the bank is installed.
pub fn with_pins<R>(f: impl FnOnce(&mut PinBank) -> R) -> Option<R> {
    PINS.lock(|cell| cell.borrow_mut().as_mut().map(f))
}
