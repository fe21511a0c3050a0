//! Embassy async tasks
//!
//! The main loop owns the protocol engine; these tasks move bytes and
//! keep pin timing that the engine cannot do between polls.

pub mod edge_sampler;
pub mod servo_pulse;
pub mod uart_rx;
pub mod uart_tx;

pub use edge_sampler::edge_sampler_task;
pub use servo_pulse::servo_pulse_task;
pub use uart_rx::uart_rx_task;
pub use uart_tx::uart_tx_task;
