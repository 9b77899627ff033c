//! # Frame Lanes
//!
//! ## Purpose
//!
//! A lane is everything one direction of the transport needs to lend frames: the frame
//! pool, the per-frame loan state and the free-list of frames that are not on loan.
//! The receive and send lanes share nothing, so the two directions can be driven from
//! different threads without coordination.
//!
//! ## How it works
//!
//! Every frame has an `expired` flag. A frame is on loan exactly while its flag is
//! clear: `lend_*` pops an index from the free-list and clears the flag, `retire` sets
//! it back and reports whether this call was the one that ended the loan. Only that
//! first call may hand the index back to the free-list, which keeps an index from ever
//! being queued twice no matter how often a loan is ended.
//!
//! ## Main components
//!
//! - `FrameLane<D>`: one direction, `_RX` or `_TX`.
//! - `RecvLane`, `SendLane`: the two instantiations used by `Transport`.

use crate::pool::FramePool;
use crate::queue::FreeList;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub type _Direction = bool;
pub const _RX: _Direction = false;
pub const _TX: _Direction = true;

pub type RecvLane = FrameLane<_RX>;
pub type SendLane = FrameLane<_TX>;

pub struct FrameLane<const D: _Direction> {
    pool: FramePool,
    expired: Box<[AtomicBool]>,
    free: FreeList,
}

impl<const D: _Direction> FrameLane<D> {
    /// Allocates the pool and seeds the free-list with every frame.
    pub fn new(num_frames: usize, frame_size: usize, huge_page: Option<bool>) -> io::Result<Self> {
        if num_frames == 0 || num_frames > u32::MAX as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid number of {} frames: {num_frames}", Self::name()),
            ));
        }
        let pool = FramePool::make(num_frames, frame_size, huge_page)?;
        let expired = (0..num_frames).map(|_| AtomicBool::new(true)).collect();
        let free = FreeList::with_capacity(num_frames)?;
        for index in 0..num_frames as u32 {
            free.push_with_pop_on_full(index);
        }
        log::debug!(
            "{} lane: {num_frames} frames of {frame_size} bytes ({} bytes mapped)",
            Self::name(),
            pool.mapped_len()
        );
        Ok(Self {
            pool,
            expired,
            free,
        })
    }

    pub fn name() -> &'static str {
        if D == _TX { "send" } else { "recv" }
    }

    /// Pops a free frame without waiting and puts it on loan.
    pub fn lend_with_haste(&self) -> Option<u32> {
        let index = self.free.pop_with_haste()?;
        self.loan(index);
        Some(index)
    }

    /// Pops a free frame, waiting up to `timeout`, and puts it on loan.
    pub fn lend_with_timed_wait(&self, timeout: Duration) -> Option<u32> {
        let index = self.free.pop_with_timed_wait(timeout)?;
        self.loan(index);
        Some(index)
    }

    fn loan(&self, index: u32) {
        let was_expired = self.expired[index as usize].swap(false, Ordering::AcqRel);
        debug_assert!(was_expired, "frame {index} lent twice");
    }

    /// Ends the loan of `index`. Returns `false` if it had already ended.
    pub fn retire(&self, index: u32) -> bool {
        !self.expired[index as usize].swap(true, Ordering::AcqRel)
    }

    /// Returns a retired frame to the free-list.
    pub fn recycle(&self, index: u32) {
        self.free.push_with_pop_on_full(index);
    }

    /// Retires and recycles `index` in one step; a no-op for an expired frame.
    pub fn give_back(&self, index: u32) -> bool {
        if self.retire(index) {
            self.recycle(index);
            true
        } else {
            false
        }
    }

    pub fn is_on_loan(&self, index: u32) -> bool {
        !self.expired[index as usize].load(Ordering::Acquire)
    }

    #[inline]
    pub fn frame(&self, index: u32) -> *mut u8 {
        self.pool.at(index as usize)
    }

    pub fn num_frames(&self) -> usize {
        self.pool.num_frames()
    }

    pub fn frame_size(&self) -> usize {
        self.pool.frame_size()
    }

    pub fn num_free(&self) -> usize {
        self.free.len()
    }

    pub fn evictions(&self) -> u64 {
        self.free.evictions()
    }
}
