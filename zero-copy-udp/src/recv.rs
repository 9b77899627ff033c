//! # Receive Path
//!
//! ## Purpose
//!
//! Lends out receive frames filled with one datagram each.
//!
//! ## How it works
//!
//! `get_recv_buff` first waits for the socket to become readable. Only then does it
//! take a frame from the receive free-list, so a timeout never moves a frame. When the
//! free-list is empty the datagram stays queued in the kernel and the call reports no
//! buffer: the caller holds every frame and has to release some. Otherwise exactly one
//! non-blocking `recv` fills the frame. `MSG_TRUNC` makes the kernel report the full
//! datagram length, which is how an oversized datagram is detected and logged. If the
//! read finds nothing (another thread won the datagram) the frame goes back and the
//! wait resumes with whatever is left of `timeout`.
//!
//! ## Main components
//!
//! - `Transport::get_recv_buff()`

use crate::buffer::RecvBuffer;
use crate::socket::Transport;
use std::io;
use std::os::fd::AsRawFd as _;
use std::time::{Duration, Instant};

impl Transport {
    /// Receives one datagram into a free frame, waiting up to `timeout` for it.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(buff))` with the received bytes; a zero-length datagram gives an
    ///   empty buffer.
    /// - `Ok(None)` if nothing arrived within `timeout`, or if every receive frame is
    ///   on loan.
    ///
    /// # Errors
    ///
    /// An OS error from waiting or reading, e.g. `ConnectionRefused` after the peer
    /// answered an earlier send with ICMP port unreachable. The frame is back in the
    /// pool when the error is returned.
    pub fn get_recv_buff(&self, timeout: Duration) -> io::Result<Option<RecvBuffer<'_>>> {
        let deadline = Instant::now().checked_add(timeout);
        let mut remaining = timeout;
        loop {
            if !self.poll_wait(remaining)? {
                return Ok(None);
            }
            let Some(index) = self.recv.lend_with_haste() else {
                log::trace!("datagram pending but all {} receive frames are on loan", self.num_recv_frames());
                return Ok(None);
            };
            match self.recv_frame(index) {
                Ok(Some(len)) => return Ok(Some(RecvBuffer::new(&self.recv, index, len))),
                Ok(None) => {
                    self.recv.give_back(index);
                }
                Err(e) => {
                    self.recv.give_back(index);
                    return Err(e);
                }
            }
            // readiness was stale: another receiver took the datagram first
            if let Some(deadline) = deadline {
                remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    return Ok(None);
                }
            }
        }
    }

    /// Reads one pending datagram into `index` without blocking.
    ///
    /// Returns the valid length, or `None` if the socket had nothing to read.
    fn recv_frame(&self, index: u32) -> io::Result<Option<usize>> {
        let frame_size = self.recv.frame_size();
        let len = loop {
            let ret = unsafe {
                libc::recv(
                    self.fd.as_raw_fd(),
                    self.recv.frame(index) as *mut libc::c_void,
                    frame_size,
                    libc::MSG_TRUNC | libc::MSG_DONTWAIT,
                )
            };
            if ret >= 0 {
                break ret as usize;
            }
            let err = io::Error::last_os_error();
            match err.kind() {
                io::ErrorKind::Interrupted => continue,
                io::ErrorKind::WouldBlock => return Ok(None),
                _ => return Err(err),
            }
        };
        if len > frame_size {
            log::warn!("datagram of {len} bytes truncated to the {frame_size} byte receive frame");
        }
        Ok(Some(len.min(frame_size)))
    }
}
