use std::time::Duration;

use natmsg_port::Port;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

use crate::error::{RelayError, Result};

/// Synchronization token exchanged once at relay startup.
///
/// The parent always speaks first: it writes the token on the inner port
/// and waits for the child to echo it back, confirming the channel is
/// live in both directions before steady-state traffic starts.
pub const SYNC_TOKEN: &str = "SYNC";

/// Parent half of the startup handshake.
///
/// Writes the token, then waits for any response. `None` waits without
/// bound; exceeding a bound fails with [`RelayError::Timeout`], measured
/// over the whole round trip. Failure is fatal to relay startup and must
/// not be retried.
pub async fn sync_parent<R, W>(port: &mut Port<R, W>, timeout: Option<Duration>) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    match timeout {
        Some(bound) => tokio::time::timeout(bound, sync_parent_inner(port))
            .await
            .map_err(|_| RelayError::Timeout(bound))?,
        None => sync_parent_inner(port).await,
    }
}

async fn sync_parent_inner<R, W>(port: &mut Port<R, W>) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    port.write(SYNC_TOKEN).await?;
    debug!(token = SYNC_TOKEN, "synchronization token sent");

    let reply = port.read().await?;
    debug!(%reply, "synchronization reply received");
    Ok(())
}

/// Child half of the startup handshake: read the parent's token and echo
/// it back, before entering the message loop.
pub async fn sync_child<R, W>(port: &mut Port<R, W>) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let token = port.read().await?;
    if token != SYNC_TOKEN {
        return Err(RelayError::Handshake(format!(
            "unexpected synchronization token '{token}'"
        )));
    }
    debug!(%token, "synchronization token received");

    port.write(&token).await?;
    debug!("synchronization token echoed");
    Ok(())
}
