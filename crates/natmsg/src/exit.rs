use std::fmt;
use std::io;

use natmsg_port::PortError;
use natmsg_relay::RelayError;

// Exit codes follow common sysexits/timeout conventions.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn port_error(context: &str, err: PortError) -> CliError {
    match err {
        PortError::Io(source) => io_error(context, source),
        PortError::Protocol(_) => CliError::new(DATA_INVALID, format!("{context}: {err}")),
        PortError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        PortError::EndOfStream => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn relay_error(context: &str, err: RelayError) -> CliError {
    match err {
        RelayError::Port(err) => port_error(context, err),
        RelayError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        RelayError::Spawn(source) | RelayError::Channel(source) => io_error(context, source),
        RelayError::Handshake(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        RelayError::Ports(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        RelayError::Handler(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
