//! Linux backend: `prctl(PR_SET_PDEATHSIG, SIGKILL)`.

use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command};

use tracing::warn;

/// Arm the current process to receive SIGKILL when its parent dies.
pub fn bind_to_parent() {
    // SAFETY: prctl with PR_SET_PDEATHSIG takes no pointers.
    let result = unsafe { libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL) };
    if result != 0 {
        warn!(
            error = %io::Error::last_os_error(),
            "prctl(PR_SET_PDEATHSIG) failed; child will not follow parent exit"
        );
    }
}

/// Spawn a child armed to die when this process dies.
pub fn spawn_coupled(mut command: Command) -> io::Result<Child> {
    // SAFETY: prctl(PR_SET_PDEATHSIG) is async-signal-safe.
    unsafe {
        command.pre_exec(|| {
            let result = libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL);
            if result != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }

    command.spawn()
}

/// Forcibly terminate a tracked process.
pub fn kill(pid: u32) {
    // SAFETY: kill takes a pid and a signal number, no pointers.
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGKILL);
    }
}
