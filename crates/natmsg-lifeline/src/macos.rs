//! macOS backend: pipe-based parent death detection.
//!
//! macOS has no PR_SET_PDEATHSIG, so the coupling runs over a pipe:
//! the parent keeps the write end for its whole lifetime, the child
//! inherits the read end and watches it from a background thread. When
//! the parent dies the pipe closes, the watcher's read returns zero, and
//! the child exits.

use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::process::{Child, Command};

use tracing::{debug, warn};

use crate::DEATH_PIPE_ENV;

/// Start the parent-death watchdog if this process was spawned coupled.
pub fn bind_to_parent() {
    let Ok(fd_text) = std::env::var(DEATH_PIPE_ENV) else {
        return;
    };
    let Ok(fd) = fd_text.parse::<RawFd>() else {
        warn!(value = %fd_text, "ignoring malformed death-pipe fd");
        return;
    };

    // SAFETY: the fd was created by the spawning parent for this child
    // and is not owned by anything else in this process.
    let fd = unsafe { OwnedFd::from_raw_fd(fd) };
    std::thread::spawn(move || {
        let raw_fd = fd.as_raw_fd();
        let mut buf = [0u8; 1];
        loop {
            // SAFETY: reads into a one-byte local buffer.
            let read = unsafe { libc::read(raw_fd, buf.as_mut_ptr().cast(), 1) };
            if read <= 0 {
                debug!("parent exited; following");
                std::process::exit(0);
            }
        }
    });
}

/// Spawn a child armed to die when this process dies.
pub fn spawn_coupled(mut command: Command) -> io::Result<Child> {
    let mut fds = [0 as libc::c_int; 2];
    // SAFETY: pipe writes two fds into the provided array.
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return Err(io::Error::last_os_error());
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    // The read end must survive exec into the child; the write end must
    // stay private to this process.
    // SAFETY: fcntl on fds this function just created.
    unsafe {
        let flags = libc::fcntl(read_fd, libc::F_GETFD);
        if flags != -1 {
            libc::fcntl(read_fd, libc::F_SETFD, flags & !libc::FD_CLOEXEC);
        }
        let flags = libc::fcntl(write_fd, libc::F_GETFD);
        if flags != -1 {
            libc::fcntl(write_fd, libc::F_SETFD, flags | libc::FD_CLOEXEC);
        }
    }

    command.env(DEATH_PIPE_ENV, read_fd.to_string());
    let child = command.spawn()?;

    // SAFETY: this process owns both ends; the child holds its own copy
    // of the read end.
    unsafe {
        libc::close(read_fd);
    }
    // The write end must stay open until this process exits.
    std::mem::forget(unsafe { OwnedFd::from_raw_fd(write_fd) });

    Ok(child)
}

/// Forcibly terminate a tracked process.
pub fn kill(pid: u32) {
    // SAFETY: kill takes a pid and a signal number, no pointers.
    unsafe {
        libc::kill(pid as libc::pid_t, libc::SIGKILL);
    }
}
