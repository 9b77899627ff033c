//! # Managed Buffers
//!
//! ## Purpose
//!
//! The handles a caller holds while a frame is on loan. A `RecvBuffer` is a read-only
//! view of one received datagram; a `SendBuffer` is a writable frame waiting to be
//! committed.
//!
//! ## How it works
//!
//! A handle borrows the transport and names its frame by index. Ending a loan consumes
//! the handle (`release` / `commit`), so a handle cannot be used after its frame went
//! back to the pool:
//!
//! ```compile_fail,E0382
//! # fn demo(transport: &zero_copy_udp::Transport) -> std::io::Result<()> {
//! let buff = transport.get_send_buff(std::time::Duration::ZERO).unwrap();
//! buff.commit(10)?;
//! buff.commit(5)?; // use of moved value
//! # Ok(())
//! # }
//! ```
//!
//! A handle that is dropped without an explicit call still returns its frame. For a
//! receive buffer this is the same as `release`; a send buffer dropped uncommitted is
//! expired without transmitting anything.
//!
//! ## Main components
//!
//! - `RecvBuffer`: derefs to exactly the bytes that were received.
//! - `SendBuffer`: derefs mutably to the whole frame; `commit(len)` sends the first `len`.

use crate::lane::RecvLane;
use crate::socket::Transport;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::{fmt, io, slice};

/// A received datagram on loan from the transport.
pub struct RecvBuffer<'a> {
    lane: &'a RecvLane,
    index: u32,
    len: usize,
}

impl<'a> RecvBuffer<'a> {
    /// Wraps a frame that was just filled with `len` bytes.
    pub(crate) fn new(lane: &'a RecvLane, index: u32, len: usize) -> Self {
        debug_assert!(len <= lane.frame_size());
        debug_assert!(lane.is_on_loan(index));
        Self { lane, index, len }
    }

    #[cfg(test)]
    pub(crate) fn frame_index(&self) -> u32 {
        self.index
    }

    /// Number of valid bytes in the frame.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` for a zero-length datagram.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: the frame stays mapped for the lane's lifetime and is exclusively ours
        // while on loan; `len` never exceeds the frame size.
        unsafe { slice::from_raw_parts(self.lane.frame(self.index), self.len) }
    }

    /// Returns the frame to the receive free-list.
    pub fn release(self) {
        // the frame may be lent again as soon as it is queued, so skip our own drop
        let this = ManuallyDrop::new(self);
        this.lane.give_back(this.index);
    }
}

impl Deref for RecvBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for RecvBuffer<'_> {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl Drop for RecvBuffer<'_> {
    fn drop(&mut self) {
        self.lane.give_back(self.index);
    }
}

impl fmt::Debug for RecvBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecvBuffer")
            .field("frame", &self.index)
            .field("len", &self.len)
            .finish()
    }
}

/// A writable frame on loan from the transport.
pub struct SendBuffer<'a> {
    transport: &'a Transport,
    index: u32,
}

impl<'a> SendBuffer<'a> {
    pub(crate) fn new(transport: &'a Transport, index: u32) -> Self {
        debug_assert!(transport.send.is_on_loan(index));
        Self { transport, index }
    }

    #[cfg(test)]
    pub(crate) fn frame_index(&self) -> u32 {
        self.index
    }

    /// Number of bytes the frame can hold.
    pub fn capacity(&self) -> usize {
        self.transport.send.frame_size()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: see `RecvBuffer::as_slice`; the whole frame belongs to this loan.
        unsafe { slice::from_raw_parts_mut(self.transport.send.frame(self.index), self.capacity()) }
    }

    pub fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.transport.send.frame(self.index), self.capacity()) }
    }

    /// Transmits the first `len` bytes of the frame and returns it to the pool.
    ///
    /// The frame goes back to the send free-list whether or not the send succeeds.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `len` exceeds `capacity()`, otherwise any error of the
    /// underlying `send`.
    pub fn commit(self, len: usize) -> io::Result<()> {
        let this = ManuallyDrop::new(self);
        this.transport.commit_frame(this.index, len)
    }
}

impl Deref for SendBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl DerefMut for SendBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

impl Drop for SendBuffer<'_> {
    fn drop(&mut self) {
        if self.transport.send.give_back(self.index) {
            log::debug!("send frame {} dropped without commit", self.index);
        }
    }
}

impl fmt::Debug for SendBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendBuffer")
            .field("frame", &self.index)
            .field("capacity", &self.capacity())
            .finish()
    }
}
