use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{PortError, Result};

/// Size of the length prefix preceding every message.
pub const LENGTH_SIZE: usize = 4;

/// Encode a message into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────────┬──────────────────┐
/// │ Length (4B, i32,   │ Payload           │
/// │ native endianness) │ (Length UTF-8     │
/// │                    │  bytes)           │
/// └────────────────────┴──────────────────┘
/// ```
///
/// The prefix is a signed 32-bit integer in the platform's byte order,
/// matching what the browser writes on its side of the pipe.
pub fn encode_message(message: &str) -> Result<Bytes> {
    let payload = message.as_bytes();
    if payload.len() > i32::MAX as usize {
        return Err(PortError::Protocol(format!(
            "message too long for a signed 32-bit length prefix: {} bytes",
            payload.len()
        )));
    }

    let mut buf = BytesMut::with_capacity(LENGTH_SIZE + payload.len());
    buf.put_slice(&(payload.len() as i32).to_ne_bytes());
    buf.put_slice(payload);
    Ok(buf.freeze())
}

/// Interpret a length prefix read off the wire.
///
/// Zero and negative lengths are protocol violations; so is a length above
/// the configured maximum, when one is set.
pub fn decode_length(prefix: [u8; LENGTH_SIZE], max: Option<usize>) -> Result<usize> {
    let length = i32::from_ne_bytes(prefix);
    if length <= 0 {
        return Err(PortError::Protocol(format!(
            "zero or negative message length: {length}"
        )));
    }

    let length = length as usize;
    if let Some(max) = max {
        if length > max {
            return Err(PortError::Protocol(format!(
                "message length {length} exceeds maximum {max}"
            )));
        }
    }
    Ok(length)
}

/// Configuration shared by a port's reader and writer.
#[derive(Debug, Clone, Default)]
pub struct PortConfig {
    /// Timeout applied to each read operation. `None` waits indefinitely.
    pub read_timeout: Option<std::time::Duration>,
    /// Timeout applied to each write operation. `None` waits indefinitely.
    pub write_timeout: Option<std::time::Duration>,
    /// Maximum accepted message size in bytes. `None` accepts anything the
    /// length prefix can express.
    pub max_message_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_prefixes_payload_length() {
        let frame = encode_message("hello").unwrap();

        assert_eq!(frame.len(), LENGTH_SIZE + 5);
        assert_eq!(frame[..LENGTH_SIZE], 5i32.to_ne_bytes());
        assert_eq!(&frame[LENGTH_SIZE..], b"hello");
    }

    #[test]
    fn decode_length_roundtrip() {
        let frame = encode_message("some message").unwrap();
        let mut prefix = [0u8; LENGTH_SIZE];
        prefix.copy_from_slice(&frame[..LENGTH_SIZE]);

        assert_eq!(decode_length(prefix, None).unwrap(), 12);
    }

    #[test]
    fn decode_length_rejects_zero() {
        let err = decode_length(0i32.to_ne_bytes(), None).unwrap_err();
        assert!(matches!(err, PortError::Protocol(_)));
    }

    #[test]
    fn decode_length_rejects_negative() {
        let err = decode_length((-5i32).to_ne_bytes(), None).unwrap_err();
        assert!(matches!(err, PortError::Protocol(_)));
    }

    #[test]
    fn decode_length_enforces_maximum() {
        let err = decode_length(1024i32.to_ne_bytes(), Some(16)).unwrap_err();
        assert!(matches!(err, PortError::Protocol(_)));

        assert_eq!(decode_length(16i32.to_ne_bytes(), Some(16)).unwrap(), 16);
    }

    #[test]
    fn encode_empty_message() {
        // A zero-length prefix is invalid on the wire, so encoding the
        // empty string produces a frame the reader would reject.
        let frame = encode_message("").unwrap();
        assert_eq!(frame[..LENGTH_SIZE], 0i32.to_ne_bytes());

        let mut prefix = [0u8; LENGTH_SIZE];
        prefix.copy_from_slice(&frame[..LENGTH_SIZE]);
        assert!(decode_length(prefix, None).is_err());
    }
}
