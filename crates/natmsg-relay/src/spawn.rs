//! Processor spawn and the private relay⇄processor channel.
//!
//! The channel is a Unix domain socket bound inside a fresh private
//! directory. Its path is the opaque token the child receives on its
//! command line and round-trips unchanged: the relay listens, spawns the
//! child with `process --pipe=<path>`, and accepts exactly one
//! connection.

use std::path::{Path, PathBuf};
use std::process::Child;
use std::time::Duration;

use natmsg_lifeline::ProcessGroup;
use natmsg_port::Port;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info};

use crate::error::{RelayError, Result};

/// Subcommand instructing a spawned copy of the host to run as the
/// message processor.
pub const PROCESS_MODE_ARG: &str = "process";

/// The inner port type produced on both sides of the channel.
pub type ChannelPort = Port<OwnedReadHalf, OwnedWriteHalf>;

/// Spawn `program` in processor mode and establish the private channel
/// to it, coupling the child's lifetime to this process through `group`.
///
/// `accept_timeout` bounds how long the relay waits for the freshly
/// spawned child to connect back. Failures here are fatal to startup.
pub async fn spawn_processor(
    program: &Path,
    group: &mut ProcessGroup,
    accept_timeout: Option<Duration>,
) -> Result<(Child, ChannelPort)> {
    let dir = channel_dir()?;
    let socket_path = dir.join("processor.sock");

    // A crashed predecessor with a recycled pid can leave a stale socket
    // behind; never remove anything that is not a socket.
    if socket_path.exists() {
        use std::os::unix::fs::FileTypeExt;
        let metadata = std::fs::symlink_metadata(&socket_path).map_err(RelayError::Channel)?;
        if !metadata.file_type().is_socket() {
            return Err(RelayError::Channel(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "existing channel path is not a socket",
            )));
        }
        debug!(path = ?socket_path, "removing stale channel socket");
        std::fs::remove_file(&socket_path).map_err(RelayError::Channel)?;
    }

    let listener = UnixListener::bind(&socket_path).map_err(RelayError::Channel)?;
    debug!(path = ?socket_path, "listening for processor");

    let mut command = std::process::Command::new(program);
    command
        .arg(PROCESS_MODE_ARG)
        .arg(format!("--pipe={}", socket_path.display()));
    let child = group.spawn_bound(command).map_err(RelayError::Spawn)?;
    info!(child_pid = child.id(), "processor started");

    let stream = match accept_timeout {
        Some(bound) => tokio::time::timeout(bound, listener.accept())
            .await
            .map_err(|_| RelayError::Timeout(bound))?
            .map_err(RelayError::Channel)?
            .0,
        None => listener.accept().await.map_err(RelayError::Channel)?.0,
    };
    debug!("processor connected");

    // Both ends hold the socket now; the path is no longer needed.
    let _ = std::fs::remove_dir_all(&dir);

    let (read_half, write_half) = stream.into_split();
    Ok((child, Port::new(read_half, write_half)))
}

/// Connect to the relay from inside a spawned processor, using the token
/// received at spawn time.
pub async fn connect_processor(token: &str) -> Result<ChannelPort> {
    let stream = UnixStream::connect(token)
        .await
        .map_err(RelayError::Channel)?;
    debug!(%token, "connected to relay");

    let (read_half, write_half) = stream.into_split();
    Ok(Port::new(read_half, write_half))
}

/// A fresh directory for this process's channel socket, private to the
/// current user.
fn channel_dir() -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("natmsg-{}", std::process::id()));
    std::fs::create_dir_all(&dir).map_err(RelayError::Channel)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
            .map_err(RelayError::Channel)?;
    }

    Ok(dir)
}
