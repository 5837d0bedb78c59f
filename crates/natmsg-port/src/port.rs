use tokio::io::{AsyncRead, AsyncWrite, Stdin, Stdout};

use crate::codec::PortConfig;
use crate::error::Result;
use crate::reader::MessageReader;
use crate::writer::MessageWriter;

/// One bidirectional framed-message channel over a byte stream pair.
///
/// A port owns one input stream and one output stream. Read and write
/// state machines are independent: to keep a read and a write in flight
/// concurrently, [`split`](Port::split) the port into its halves and
/// drive each from its own task. On either form, the `&mut` receivers
/// guarantee at most one outstanding operation of each kind.
#[derive(Debug)]
pub struct Port<R, W> {
    reader: MessageReader<R>,
    writer: MessageWriter<W>,
}

impl Port<Stdin, Stdout> {
    /// A port over this process's standard input and output — the
    /// channel a browser connects to its native messaging host.
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }

    /// A stdio port with explicit configuration.
    pub fn stdio_with_config(config: PortConfig) -> Self {
        Self::with_config(tokio::io::stdin(), tokio::io::stdout(), config)
    }
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> Port<R, W> {
    /// Create a port over an input/output stream pair.
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, PortConfig::default())
    }

    /// Create a port with explicit configuration.
    pub fn with_config(input: R, output: W, config: PortConfig) -> Self {
        Self {
            reader: MessageReader::with_config(input, config.clone()),
            writer: MessageWriter::with_config(output, config),
        }
    }

    /// Read the next complete message.
    pub async fn read(&mut self) -> Result<String> {
        self.reader.read_message().await
    }

    /// Write one message.
    pub async fn write(&mut self, message: &str) -> Result<()> {
        self.writer.write_message(message).await
    }

    /// Split the port into its independent read and write halves.
    pub fn split(self) -> (MessageReader<R>, MessageWriter<W>) {
        (self.reader, self.writer)
    }

    /// Reassemble a port from its halves.
    pub fn join(reader: MessageReader<R>, writer: MessageWriter<W>) -> Self {
        Self { reader, writer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PortError;

    #[tokio::test]
    async fn roundtrip_over_duplex_pair() {
        let (left, right) = tokio::io::duplex(256);
        let (left_read, left_write) = tokio::io::split(left);
        let (right_read, right_write) = tokio::io::split(right);

        let mut a = Port::new(left_read, left_write);
        let mut b = Port::new(right_read, right_write);

        a.write("ping").await.unwrap();
        assert_eq!(b.read().await.unwrap(), "ping");

        b.write("pong").await.unwrap();
        assert_eq!(a.read().await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn split_halves_progress_concurrently() {
        let (left, right) = tokio::io::duplex(64);
        let (left_read, left_write) = tokio::io::split(left);
        let (right_read, right_write) = tokio::io::split(right);

        let (mut reader, mut writer) = Port::new(left_read, left_write).split();
        let (mut peer_reader, mut peer_writer) = Port::new(right_read, right_write).split();

        // Drive a read and a write on the same port from separate tasks.
        let read_task = tokio::spawn(async move { reader.read_message().await });
        let write_task = tokio::spawn(async move {
            for i in 0..8 {
                writer.write_message(&format!("out-{i}")).await?;
            }
            Ok::<_, PortError>(writer)
        });

        peer_writer.write_message("in-0").await.unwrap();
        for i in 0..8 {
            assert_eq!(peer_reader.read_message().await.unwrap(), format!("out-{i}"));
        }

        assert_eq!(read_task.await.unwrap().unwrap(), "in-0");
        write_task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn join_reassembles_port() {
        let (left, right) = tokio::io::duplex(64);
        let (left_read, left_write) = tokio::io::split(left);
        let (right_read, right_write) = tokio::io::split(right);

        let (reader, writer) = Port::new(left_read, left_write).split();
        let mut rejoined = Port::join(reader, writer);
        let mut peer = Port::new(right_read, right_write);

        rejoined.write("still works").await.unwrap();
        assert_eq!(peer.read().await.unwrap(), "still works");
    }

    #[tokio::test]
    async fn peer_close_yields_end_of_stream() {
        let (left, right) = tokio::io::duplex(64);
        let (left_read, left_write) = tokio::io::split(left);

        let mut port = Port::new(left_read, left_write);
        drop(right);

        let err = port.read().await.unwrap_err();
        assert!(matches!(err, PortError::EndOfStream));
    }
}
