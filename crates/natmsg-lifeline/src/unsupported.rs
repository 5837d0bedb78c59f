//! Fallback backend: no parent-death signal; drop-time kill only.

use std::io;
use std::process::{Child, Command};

use tracing::warn;

pub fn bind_to_parent() {
    warn!("process lifetime coupling is not supported on this platform");
}

pub fn spawn_coupled(mut command: Command) -> io::Result<Child> {
    warn!("spawning without parent-death coupling; relying on drop-time kill");
    command.spawn()
}

pub fn kill(_pid: u32) {
    warn!("cannot kill tracked process on this platform");
}
