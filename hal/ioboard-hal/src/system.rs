//! Board identity and supervision

/// Fixed board facts and on-die sensors
pub trait SystemInfo {
    /// 16-bit board identifier
    fn board_id(&self) -> u16;

    /// Raw reading of the on-die temperature sensor
    fn read_die_temperature(&mut self) -> u16;
}

/// Hardware watchdog
///
/// Once started, the board restarts unless [`feed`](Watchdog::feed) is
/// called within the watchdog period.
pub trait Watchdog {
    fn feed(&mut self);
}
