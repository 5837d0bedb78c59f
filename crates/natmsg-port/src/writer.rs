use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::codec::{encode_message, PortConfig, LENGTH_SIZE};
use crate::error::{PortError, Result};

/// Writes complete messages to any async byte stream.
#[derive(Debug)]
pub struct MessageWriter<W> {
    inner: W,
    config: PortConfig,
}

impl<W: AsyncWrite + Unpin> MessageWriter<W> {
    /// Create a new message writer with default configuration.
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, PortConfig::default())
    }

    /// Create a new message writer with explicit configuration.
    pub fn with_config(inner: W, config: PortConfig) -> Self {
        Self { inner, config }
    }

    /// Encode and write one message.
    ///
    /// The length prefix is written in full before the payload, and the
    /// stream is flushed once the payload is down.
    pub async fn write_message(&mut self, message: &str) -> Result<()> {
        match self.config.write_timeout {
            Some(bound) => tokio::time::timeout(bound, self.write_message_inner(message))
                .await
                .map_err(|_| PortError::Timeout(bound))?,
            None => self.write_message_inner(message).await,
        }
    }

    async fn write_message_inner(&mut self, message: &str) -> Result<()> {
        if let Some(max) = self.config.max_message_size {
            if message.len() > max {
                return Err(PortError::Protocol(format!(
                    "message length {} exceeds maximum {max}",
                    message.len()
                )));
            }
        }

        let frame = encode_message(message)?;
        self.inner.write_all(&frame[..LENGTH_SIZE]).await?;
        self.inner.write_all(&frame[LENGTH_SIZE..]).await?;
        self.inner.flush().await?;

        trace!(length = frame.len() - LENGTH_SIZE, "message sent");
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &PortConfig {
        &self.config
    }
}
