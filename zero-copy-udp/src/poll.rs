//!
//! # Timed Readability Wait
//!
//! `poll_wait` blocks until the transport socket is readable or the timeout expires.
//! The remaining time is recomputed after every `EINTR`, so a signal never stretches
//! the wait beyond its deadline. Timeouts are rounded up to whole milliseconds so a
//! short wait is never turned into a non-blocking check.
//!

use crate::socket::Transport;
use std::io;
use std::os::fd::{AsRawFd as _, RawFd};
use std::time::{Duration, Instant};

impl Transport {
    /// Waits up to `timeout` for the socket to become readable.
    ///
    /// Returns `Ok(false)` when the timeout expired. A pending socket error also counts
    /// as readable; the following read reports it.
    pub fn poll_wait(&self, timeout: Duration) -> io::Result<bool> {
        poll_readable(self.fd.as_raw_fd(), timeout)
    }
}

pub(crate) fn poll_readable(raw_fd: RawFd, timeout: Duration) -> io::Result<bool> {
    let deadline = Instant::now().checked_add(timeout);
    let mut remaining = timeout;
    loop {
        let mut fds = [libc::pollfd {
            fd: raw_fd,
            events: libc::POLLIN,
            revents: 0,
        }];
        let ret = unsafe { libc::poll(fds.as_mut_ptr(), 1, poll_millis(remaining)) };
        if ret > 0 {
            if fds[0].revents & libc::POLLNVAL != 0 {
                return Err(io::Error::from_raw_os_error(libc::EBADF));
            }
            return Ok(fds[0].revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0);
        }
        if ret == 0 {
            return Ok(false);
        }
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::Interrupted {
            return Err(err);
        }
        if let Some(deadline) = deadline {
            remaining = deadline.saturating_duration_since(Instant::now());
        }
    }
}

fn poll_millis(timeout: Duration) -> libc::c_int {
    let millis = timeout.as_nanos().div_ceil(1_000_000);
    libc::c_int::try_from(millis).unwrap_or(libc::c_int::MAX)
}
