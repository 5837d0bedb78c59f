use std::time::Duration;

use natmsg_port::PortError;

/// Errors that can occur while setting up or running a relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A port operation failed during handshake or setup.
    #[error("port failure: {0}")]
    Port(#[from] PortError),

    /// The startup handshake exceeded its bound.
    #[error("handshake timed out after {0:?}")]
    Timeout(Duration),

    /// The handshake exchange itself went wrong.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// Faults collected from the pump directions.
    ///
    /// Both directions report into one collector; callers must not
    /// assume a single cause.
    #[error("relay stopped with {} fault(s)", .0.len())]
    Ports(Vec<PortError>),

    /// Spawning the processor child failed.
    #[error("failed to spawn processor: {0}")]
    Spawn(#[source] std::io::Error),

    /// Establishing the private channel to the processor failed.
    #[error("failed to establish processor channel: {0}")]
    Channel(#[source] std::io::Error),

    /// The application handler rejected a message.
    #[error("message handler failed: {0}")]
    Handler(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RelayError>;
