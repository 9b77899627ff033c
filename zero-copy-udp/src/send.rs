//! # Send Path
//!
//! ## Purpose
//!
//! Lends out writable send frames and transmits them on commit.
//!
//! ## How it works
//!
//! `get_send_buff` only waits on the send free-list, never on the network: a frame is
//! available as soon as a previous loan ended, possibly on another thread. `commit`
//! first ends the loan, which makes a repeated commit of the same frame a no-op, then
//! sends the first `len` bytes with a single `send` and finally queues the frame again.
//! The frame is not touched after it is queued.
//!
//! ## Main components
//!
//! - `Transport::get_send_buff()`
//! - `Transport::commit_frame()`: the body of `SendBuffer::commit`.

use crate::buffer::SendBuffer;
use crate::socket::Transport;
use std::io;
use std::os::fd::AsRawFd as _;
use std::time::Duration;

impl Transport {
    /// Takes a free send frame, waiting up to `timeout` for one to be committed.
    ///
    /// Returns `None` if every send frame is still on loan; `Duration::ZERO` never
    /// waits.
    pub fn get_send_buff(&self, timeout: Duration) -> Option<SendBuffer<'_>> {
        let index = self.send.lend_with_timed_wait(timeout)?;
        Some(SendBuffer::new(self, index))
    }

    /// Transmits `len` bytes of frame `index` and returns the frame to the pool.
    ///
    /// Does nothing if the frame is not on loan.
    pub(crate) fn commit_frame(&self, index: u32, len: usize) -> io::Result<()> {
        if !self.send.retire(index) {
            return Ok(());
        }
        let frame_size = self.send.frame_size();
        let result = if len > frame_size {
            Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("commit of {len} bytes exceeds the {frame_size} byte send frame"),
            ))
        } else {
            self.send_frame(index, len)
        };
        self.send.recycle(index);
        result
    }

    fn send_frame(&self, index: u32, len: usize) -> io::Result<()> {
        loop {
            let ret = unsafe {
                libc::send(
                    self.fd.as_raw_fd(),
                    self.send.frame(index) as *const libc::c_void,
                    len,
                    libc::MSG_NOSIGNAL,
                )
            };
            if ret >= 0 {
                return Ok(());
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
}
