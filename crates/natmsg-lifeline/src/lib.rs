//! Couple the lifetimes of a relay and its spawned processor.
//!
//! A relay's own parent (the browser) may kill it without any shutdown
//! protocol. Left alone, the processor child would survive as an orphan
//! and hold its channel open forever. A [`ProcessGroup`] prevents that:
//! children spawned through it are armed to die with this process, and
//! any member still tracked when the group is dropped is killed.
//!
//! Platform backends:
//!
//! - **Linux**: `prctl(PR_SET_PDEATHSIG, SIGKILL)` — the child receives
//!   SIGKILL when its parent dies, even on SIGKILL of the parent.
//! - **macOS**: an inherited pipe — the child watches the read end and
//!   exits when the parent's write end closes.
//! - **Other platforms**: drop-time kill only, with a warning.

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as imp;

#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "macos")]
use macos as imp;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
mod unsupported;
#[cfg(not(any(target_os = "linux", target_os = "macos")))]
use unsupported as imp;

use std::io;
use std::process::{Child, Command};

use tracing::debug;

/// Environment variable carrying the parent-death pipe fd on macOS.
#[cfg(target_os = "macos")]
pub const DEATH_PIPE_ENV: &str = "NATMSG_LIFELINE_FD";

/// A set of processes whose lifetimes are coupled.
///
/// Membership is append-only for the life of the group. Dropping the
/// group kills every tracked member except the calling process itself.
#[derive(Debug, Default)]
pub struct ProcessGroup {
    members: Vec<u32>,
}

impl ProcessGroup {
    /// Create an empty group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a process to the group. Idempotent.
    pub fn add(&mut self, pid: u32) {
        if !self.members.contains(&pid) {
            self.members.push(pid);
        }
    }

    /// Current group members.
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    /// Spawn `command` with the platform lifetime coupling applied and
    /// add both this process and the child to the group.
    pub fn spawn_bound(&mut self, command: Command) -> io::Result<Child> {
        let child = imp::spawn_coupled(command)?;
        self.add(std::process::id());
        self.add(child.id());
        debug!(child_pid = child.id(), "spawned lifetime-coupled child");
        Ok(child)
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        let own = std::process::id();
        for &pid in &self.members {
            if pid != own {
                imp::kill(pid);
            }
        }
    }
}

/// Arm the current process to terminate when its parent dies.
///
/// Call early in a child started through [`ProcessGroup::spawn_bound`];
/// it completes the coupling on platforms where the child participates
/// (the macOS pipe watchdog). On Linux the spawn side already armed the
/// kill signal and this call re-arms it, which is harmless.
pub fn bind_to_parent() {
    imp::bind_to_parent();
}
