//! Asynchronous native messaging ports.
//!
//! This is the core layer of natmsg. Every message crossing a port is an
//! opaque UTF-8 string framed with a 4-byte signed length prefix in the
//! platform's byte order — the wire format browsers use to talk to
//! native messaging hosts over standard input/output.
//!
//! A [`Port`] owns one input stream and one output stream and exposes
//! whole-message read/write operations; partial reads and writes are
//! handled internally. Split a port into [`MessageReader`] and
//! [`MessageWriter`] halves to keep one read and one write in flight
//! concurrently.

pub mod codec;
pub mod error;
pub mod port;
pub mod reader;
pub mod writer;

pub use codec::{decode_length, encode_message, PortConfig, LENGTH_SIZE};
pub use error::{PortError, Result};
pub use port::Port;
pub use reader::MessageReader;
pub use writer::MessageWriter;
