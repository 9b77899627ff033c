//! # Socket Buffer Sizing
//!
//! ## Purpose
//!
//! Reads and resizes the kernel receive and send buffers of the transport socket.
//! High sample rates need a receive buffer far above the OS default to ride out
//! scheduling gaps.
//!
//! ## How it works
//!
//! `SockBuf` names the option; `resize` sets it with `setsockopt` and reads back what
//! the kernel actually applied, which may differ: Linux doubles the requested value and
//! caps it at `net.core.rmem_max` / `net.core.wmem_max`. A shortfall is reported as a
//! warning and never fails transport creation.
//!
//! ## Main components
//!
//! - `SockBuf`: `Recv` (`SO_RCVBUF`) or `Send` (`SO_SNDBUF`).
//! - `resize_buff_helper()`: applies a configured size and logs the outcome.

use std::io;
use std::mem::size_of;
use std::os::fd::RawFd;

/// A kernel socket buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SockBuf {
    /// The receive buffer, `SO_RCVBUF`.
    Recv,
    /// The send buffer, `SO_SNDBUF`.
    Send,
}

impl SockBuf {
    fn as_optname(self) -> libc::c_int {
        match self {
            SockBuf::Recv => libc::SO_RCVBUF,
            SockBuf::Send => libc::SO_SNDBUF,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SockBuf::Recv => "recv",
            SockBuf::Send => "send",
        }
    }

    /// Current size of the buffer in bytes.
    pub fn get(self, raw_fd: RawFd) -> io::Result<usize> {
        let mut value: libc::c_int = 0;
        let mut optlen = size_of::<libc::c_int>() as libc::socklen_t;
        unsafe {
            if libc::getsockopt(
                raw_fd,
                libc::SOL_SOCKET,
                self.as_optname(),
                &mut value as *mut _ as *mut libc::c_void,
                &mut optlen,
            ) < 0
            {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(value.max(0) as usize)
    }

    /// Requests a buffer of `num_bytes`, saturating at `c_int::MAX`.
    pub fn set(self, raw_fd: RawFd, num_bytes: usize) -> io::Result<()> {
        let value = libc::c_int::try_from(num_bytes).unwrap_or(libc::c_int::MAX);
        unsafe {
            if libc::setsockopt(
                raw_fd,
                libc::SOL_SOCKET,
                self.as_optname(),
                &value as *const _ as *const libc::c_void,
                size_of::<libc::c_int>() as libc::socklen_t,
            ) < 0
            {
                return Err(io::Error::other(format!(
                    "Failed to set {} buffer size: {}",
                    self.name(),
                    io::Error::last_os_error()
                )));
            }
        }
        Ok(())
    }

    /// Requests `num_bytes` and returns the size the kernel applied.
    pub fn resize(self, raw_fd: RawFd, num_bytes: usize) -> io::Result<usize> {
        self.set(raw_fd, num_bytes)?;
        self.get(raw_fd)
    }

    fn sysctl_hint(self, num_bytes: usize) -> String {
        if cfg!(target_os = "linux") {
            let key = match self {
                SockBuf::Recv => "rmem_max",
                SockBuf::Send => "wmem_max",
            };
            format!("\nPlease run: sudo sysctl -w net.core.{key}={num_bytes}")
        } else {
            String::new()
        }
    }
}

/// Resizes `which` to `target` bytes; `0` leaves the OS default untouched.
///
/// Failures and shortfalls are logged, never returned: the size actually in effect is
/// available from `Transport::recv_buff_size` / `send_buff_size`.
pub(crate) fn resize_buff_helper(raw_fd: RawFd, which: SockBuf, target: usize) {
    if target == 0 {
        return;
    }
    let name = which.name();
    let actual = match which.resize(raw_fd, target) {
        Ok(actual) => actual,
        Err(e) => {
            log::warn!(
                "The {name} buffer could not be resized: {e}{}",
                which.sysctl_hint(target)
            );
            return;
        }
    };
    if actual != target {
        log::info!("Target {name} sock buff size: {target} bytes, actual {name} sock buff size: {actual} bytes");
    } else {
        log::info!("Current {name} sock buff size: {actual} bytes");
    }
    if actual < target {
        log::warn!(
            "The {name} buffer could not be resized sufficiently.\n\
             See the transport application notes on buffer resizing.{}",
            which.sysctl_hint(target)
        );
    }
}
