use natmsg_port::{Port, PortError};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::error::{RelayError, Result};
use crate::handshake;

/// Run the child-side message loop.
///
/// Answers the startup handshake, then hands every message to `handler`
/// and writes its replies back in order. The handler may produce zero or
/// more replies per message; it runs only on this process, so handlers
/// pinned to one execution context are satisfied by construction.
///
/// Returns cleanly when the relay closes the channel.
pub async fn run_processor<R, W, F, E>(mut port: Port<R, W>, mut handler: F) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    F: FnMut(&str) -> std::result::Result<Vec<String>, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    handshake::sync_child(&mut port).await?;
    info!("processor synchronized");

    loop {
        let message = match port.read().await {
            Ok(message) => message,
            Err(PortError::EndOfStream) => {
                debug!("end of message stream");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let replies = handler(&message).map_err(|err| RelayError::Handler(err.into()))?;
        for reply in &replies {
            port.write(reply).await?;
        }
    }
}
