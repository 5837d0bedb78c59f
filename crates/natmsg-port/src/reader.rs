use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::codec::{decode_length, PortConfig, LENGTH_SIZE};
use crate::error::{PortError, Result};

/// Reads complete messages from any async byte stream.
///
/// Handles short reads internally — callers always get whole messages.
#[derive(Debug)]
pub struct MessageReader<R> {
    inner: R,
    config: PortConfig,
}

impl<R: AsyncRead + Unpin> MessageReader<R> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, PortConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: R, config: PortConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next complete message.
    ///
    /// Returns `Err(PortError::EndOfStream)` when the peer closes the
    /// stream at a message boundary. A close anywhere inside a frame is a
    /// `PortError::Protocol` — a truncated message, not a clean shutdown.
    pub async fn read_message(&mut self) -> Result<String> {
        match self.config.read_timeout {
            Some(bound) => tokio::time::timeout(bound, self.read_message_inner())
                .await
                .map_err(|_| PortError::Timeout(bound))?,
            None => self.read_message_inner().await,
        }
    }

    async fn read_message_inner(&mut self) -> Result<String> {
        // Length stage: accumulate the 4-byte prefix.
        let mut prefix = [0u8; LENGTH_SIZE];
        let mut offset = 0usize;
        while offset < LENGTH_SIZE {
            let read = self.inner.read(&mut prefix[offset..]).await?;
            if read == 0 {
                if offset == 0 {
                    return Err(PortError::EndOfStream);
                }
                return Err(PortError::Protocol(
                    "unexpected end of stream inside length prefix".to_string(),
                ));
            }
            offset += read;
        }
        let length = decode_length(prefix, self.config.max_message_size)?;

        // Payload stage: fill exactly `length` bytes.
        let mut payload = vec![0u8; length];
        let mut offset = 0usize;
        while offset < length {
            let read = self.inner.read(&mut payload[offset..]).await?;
            if read == 0 {
                return Err(PortError::Protocol(
                    "unexpected end of stream inside message payload".to_string(),
                ));
            }
            offset += read;
        }

        trace!(length, "message received");
        String::from_utf8(payload)
            .map_err(|err| PortError::Protocol(format!("invalid message encoding: {err}")))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Current reader configuration.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }
}
