use std::time::Duration;

/// Errors that can occur during port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The peer closed the stream at a message boundary.
    ///
    /// This is the orderly shutdown signal, not a failure: it can only be
    /// reported between messages, never inside one.
    #[error("end of message stream")]
    EndOfStream,

    /// The byte stream violated the framing protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A configured per-operation timeout elapsed.
    #[error("port operation timed out after {0:?}")]
    Timeout(Duration),

    /// An I/O error occurred on the underlying stream.
    #[error("port I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PortError>;
