use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use natmsg_port::{MessageReader, MessageWriter, Port, PortError};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{RelayError, Result};
use crate::handshake;

/// Forwards messages between an outer port (facing the caller) and an
/// inner port (facing the spawned processor), in both directions, until
/// stream end, fault, or an external stop.
///
/// Each direction runs strict ping-pong: the next read is issued only
/// after the previous message's write completed. That preserves order
/// within a direction and caps the pump at one message of buffering.
/// The two directions run independently; nothing is ordered across them.
pub struct Relay<RO, WO, RI, WI> {
    outer: Port<RO, WO>,
    inner: Port<RI, WI>,
    faults: Arc<Mutex<Vec<PortError>>>,
    stop: CancellationToken,
}

/// Cloneable handle that forces relay shutdown.
#[derive(Clone)]
pub struct StopHandle(CancellationToken);

impl StopHandle {
    /// Request shutdown. Idempotent. No new port operations are issued
    /// after the stop is observed; operations already in flight finish
    /// or fault on their own and their results are discarded.
    pub fn stop(&self) {
        self.0.cancel();
    }
}

impl<RO, WO, RI, WI> Relay<RO, WO, RI, WI>
where
    RO: AsyncRead + Unpin + Send + 'static,
    WO: AsyncWrite + Unpin + Send + 'static,
    RI: AsyncRead + Unpin + Send + 'static,
    WI: AsyncWrite + Unpin + Send + 'static,
{
    /// Create a relay over an outer and an inner port.
    pub fn new(outer: Port<RO, WO>, inner: Port<RI, WI>) -> Self {
        Self {
            outer,
            inner,
            faults: Arc::new(Mutex::new(Vec::new())),
            stop: CancellationToken::new(),
        }
    }

    /// A handle that can stop this relay from anywhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop.clone())
    }

    /// Run the startup handshake on the inner port. Must complete before
    /// [`run`](Relay::run); a failure here is fatal to startup.
    pub async fn sync(&mut self, timeout: Option<Duration>) -> Result<()> {
        handshake::sync_parent(&mut self.inner, timeout).await
    }

    /// Pump messages both ways until stream end, fault, or stop.
    ///
    /// Returns once the stop flag is set. If either direction captured a
    /// fault, all of them are returned as [`RelayError::Ports`]; an
    /// orderly end of stream returns `Ok(())`.
    pub async fn run(self) -> Result<()> {
        info!("relay started");

        let (outer_reader, outer_writer) = self.outer.split();
        let (inner_reader, inner_writer) = self.inner.split();

        tokio::spawn(pump(
            outer_reader,
            inner_writer,
            self.stop.clone(),
            Arc::clone(&self.faults),
            "outer->inner",
        ));
        tokio::spawn(pump(
            inner_reader,
            outer_writer,
            self.stop.clone(),
            Arc::clone(&self.faults),
            "inner->outer",
        ));

        self.stop.cancelled().await;

        let faults = std::mem::take(
            &mut *self
                .faults
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        if faults.is_empty() {
            info!("relay stopped");
            Ok(())
        } else {
            error!(count = faults.len(), "relay stopped with faults");
            Err(RelayError::Ports(faults))
        }
    }
}

/// One forwarding direction: read from `reader`, write to `writer`,
/// repeat. Any termination condition cancels the shared stop token; a
/// non-orderly one is recorded in the fault collector first.
async fn pump<R, W>(
    mut reader: MessageReader<R>,
    mut writer: MessageWriter<W>,
    stop: CancellationToken,
    faults: Arc<Mutex<Vec<PortError>>>,
    direction: &'static str,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        if stop.is_cancelled() {
            debug!(direction, "stop observed; no further reads");
            return;
        }

        let message = match reader.read_message().await {
            Ok(message) => message,
            Err(PortError::EndOfStream) => {
                debug!(direction, "end of message stream");
                stop.cancel();
                return;
            }
            Err(err) => {
                error!(direction, %err, "read fault");
                record_fault(&faults, err);
                stop.cancel();
                return;
            }
        };

        // The message is dropped, not forwarded, if a stop arrived while
        // the read was in flight.
        if stop.is_cancelled() {
            debug!(direction, "stop observed; discarding message");
            return;
        }

        if let Err(err) = writer.write_message(&message).await {
            error!(direction, %err, "write fault");
            record_fault(&faults, err);
            stop.cancel();
            return;
        }
    }
}

fn record_fault(faults: &Mutex<Vec<PortError>>, err: PortError) {
    faults
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(err);
}
