//! Host-side errors

use std::time::Duration;

use ioboard_protocol::{Reply, ReplyError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Bad reply: {0}")]
    Reply(#[from] ReplyError),

    #[error("Unexpected reply: {0:?}")]
    UnexpectedReply(Reply),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("No reply within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, Error>;
