//! Traits the protocol engine is generic over

pub mod board;

pub use board::Board;
