//! Board constants
//!
//! Everything that would otherwise be a magic number in `main` lives here.
//! The link rate is fixed at build time; the protocol has no way to change
//! it.

use ioboard_hal::UartConfig;

/// Serial line settings (8N1)
pub const UART: UartConfig = UartConfig::with_baudrate(ioboard_hal::uart::DEFAULT_BAUDRATE);

/// Receive ring capacity (bytes)
pub const RX_RING_SIZE: usize = 256;

/// Transmit ring capacity (bytes); the longest reply is 259 bytes
pub const TX_RING_SIZE: usize = 512;

/// Buffered UART driver buffers
pub const UART_BUF_SIZE: usize = 256;

/// Watchdog period; a halted main loop restarts the board after this long
pub const WATCHDOG_PERIOD_MS: u64 = 500;

/// Longest the main loop sleeps waiting for received bytes
pub const POLL_INTERVAL_MS: u64 = 10;

/// Pin sampling period for edge detection
pub const EDGE_SAMPLE_PERIOD_US: u64 = 50;

/// Analog channels wired to ADC inputs (A0-A3 on GPIO26-29)
pub const WIRED_ANALOG_CHANNELS: usize = 4;

/// The ADC is 12-bit; readings are reported at 10 bits
pub const ADC_SHIFT: u32 = 2;
