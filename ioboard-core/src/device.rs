//! Main-loop step
//!
//! [`Device::poll`] is one pass of the device's main loop: refresh the
//! watchdog, then run every byte currently in the receive ring through the
//! parser, queueing replies on the transmit ring. A valid Reset halts the
//! device; from then on `poll` stops refreshing the watchdog so the
//! hardware restarts the board.

use ioboard_hal::Watchdog;

use crate::parser::{Outcome, Parser};
use crate::traits::Board;
use crate::transport::SharedRing;

/// Whether the main loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    Running,
    /// Reset acknowledged; waiting for the watchdog to fire
    Halted,
}

/// Protocol engine bound to a board, a watchdog and both rings
pub struct Device<'a, B, W, const RX: usize, const TX: usize>
where
    B: Board,
    W: Watchdog,
{
    parser: Parser,
    board: B,
    watchdog: W,
    rx: &'a SharedRing<RX>,
    tx: &'a SharedRing<TX>,
    halted: bool,
}

impl<'a, B, W, const RX: usize, const TX: usize> Device<'a, B, W, RX, TX>
where
    B: Board,
    W: Watchdog,
{
    pub fn new(board: B, watchdog: W, rx: &'a SharedRing<RX>, tx: &'a SharedRing<TX>) -> Self {
        Self {
            parser: Parser::new(),
            board,
            watchdog,
            rx,
            tx,
            halted: false,
        }
    }

    /// Run one main-loop pass
    pub fn poll(&mut self) -> DeviceState {
        if self.halted {
            return DeviceState::Halted;
        }

        self.watchdog.feed();

        let mut sink = self.tx;
        while let Some(byte) = self.rx.pop() {
            match self.parser.feed(byte, &mut self.board, &mut sink) {
                Outcome::ResetRequested => {
                    #[cfg(feature = "defmt")]
                    defmt::info!("Reset requested, waiting for watchdog");
                    self.halted = true;
                    return DeviceState::Halted;
                }
                #[cfg(feature = "defmt")]
                Outcome::Completed { class, status } if !status.is_ok() => {
                    defmt::debug!("{} request refused", class);
                }
                #[cfg(feature = "defmt")]
                Outcome::Discarded => {
                    defmt::trace!("Discarded byte {=u8:#04x}", byte);
                }
                _ => {}
            }
        }

        DeviceState::Running
    }

    pub fn state(&self) -> DeviceState {
        if self.halted {
            DeviceState::Halted
        } else {
            DeviceState::Running
        }
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut B {
        &mut self.board
    }

    pub fn watchdog(&self) -> &W {
        &self.watchdog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeMonitor;
    use crate::sim::{SimBoard, SimWatchdog};
    use crate::parser::ParserState;
    use ioboard_protocol::{DigitalPin, Request};
    use std::vec::Vec;

    fn send<const N: usize>(ring: &SharedRing<N>, request: &Request<'_>) {
        for byte in request.encode_to_vec().unwrap() {
            assert!(ring.push(byte));
        }
    }

    fn drain<const N: usize>(ring: &SharedRing<N>) -> Vec<u8> {
        core::iter::from_fn(|| ring.pop()).collect()
    }

    #[test]
    fn test_poll_feeds_watchdog_and_replies() {
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<64>::new();
        let tx = SharedRing::<64>::new();
        let mut device = Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx);

        assert_eq!(device.poll(), DeviceState::Running);
        assert_eq!(device.watchdog().feeds(), 1);
        assert!(tx.is_empty());

        send(&rx, &Request::GetId);
        assert_eq!(device.poll(), DeviceState::Running);
        assert_eq!(device.watchdog().feeds(), 2);
        assert_eq!(drain(&tx), [0x01, 0x02, 0x01, 0x00, 0x02, 0x06]);
        assert!(rx.is_empty());
    }

    #[test]
    fn test_poll_handles_back_to_back_frames() {
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<64>::new();
        let tx = SharedRing::<64>::new();
        let mut device = Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx);
        let d13 = DigitalPin::new(13).unwrap();

        send(&rx, &Request::GpioWrite { pin: d13, high: true });
        send(&rx, &Request::GpioRead { pin: d13 });
        device.poll();

        let out = drain(&tx);
        assert_eq!(&out[..4], &[0x02, 0x03, 0x01, 0x06]);
        // High, rose since last read
        assert_eq!(&out[4..], &[0x02, 0x02, 0x01, 0x03, 0x08]);
        assert!(device.board().level(d13));
    }

    #[test]
    fn test_partial_frame_waits_for_rest() {
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<64>::new();
        let tx = SharedRing::<64>::new();
        let mut device = Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx);

        rx.push(0x01);
        device.poll();
        assert!(tx.is_empty());
        assert_ne!(device.parser().state(), ParserState::AwaitingClassTag);

        rx.push(0x02);
        rx.push(0x03);
        device.poll();
        assert_eq!(drain(&tx).len(), 6);
        assert_eq!(device.parser().state(), ParserState::AwaitingClassTag);
    }

    #[test]
    fn test_reset_halts_and_starves_watchdog() {
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<64>::new();
        let tx = SharedRing::<64>::new();
        let mut device = Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx);

        send(&rx, &Request::Reset);
        send(&rx, &Request::GetId);
        assert_eq!(device.poll(), DeviceState::Halted);
        assert_eq!(drain(&tx), [0x01, 0x01, 0x01, 0x03]);

        // The GetId after Reset is never answered
        assert_eq!(device.poll(), DeviceState::Halted);
        assert_eq!(device.poll(), DeviceState::Halted);
        assert_eq!(device.watchdog().feeds(), 1);
        assert!(tx.is_empty());
        assert_eq!(device.state(), DeviceState::Halted);
    }

    #[test]
    fn test_bad_reset_checksum_keeps_running() {
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<64>::new();
        let tx = SharedRing::<64>::new();
        let mut device = Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx);

        for byte in [0x01, 0x01, 0x05] {
            rx.push(byte);
        }
        assert_eq!(device.poll(), DeviceState::Running);
        assert_eq!(drain(&tx), [0x01, 0x01, 0x00, 0x02]);
        assert_eq!(device.poll(), DeviceState::Running);
        assert_eq!(device.watchdog().feeds(), 2);
    }

    #[test]
    fn test_full_transmit_ring_drops_reply_bytes() {
        let edges = EdgeMonitor::new();
        let rx = SharedRing::<64>::new();
        let tx = SharedRing::<4>::new();
        let mut device = Device::new(SimBoard::new(&edges), SimWatchdog::new(), &rx, &tx);

        send(&rx, &Request::GetId);
        device.poll();
        assert_eq!(drain(&tx), [0x01, 0x02, 0x01, 0x00]);
        assert_eq!(device.parser().state(), ParserState::AwaitingClassTag);
    }
}
