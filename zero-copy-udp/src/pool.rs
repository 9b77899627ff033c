//! # Frame Pool
//!
//! One contiguous mapping sliced into `num_frames` frames of `frame_size` bytes.
//! Frames are identified by index and stay at the same address for the pool's
//! whole lifetime; nothing is resized or reallocated after `make`.

use crate::mmap::OwnedMmap;
use std::io;

pub struct FramePool {
    mmap: OwnedMmap,
    num_frames: usize,
    frame_size: usize,
}

// SAFETY: the pool only hands out raw frame pointers. Every frame is reachable through
// exactly one slot of a `FrameLane`, and a slot is owned by at most one buffer handle at
// a time, so no frame is ever accessed from two threads at once.
unsafe impl Send for FramePool {}
unsafe impl Sync for FramePool {}

impl FramePool {
    /// Allocates `num_frames * frame_size` bytes once.
    pub fn make(num_frames: usize, frame_size: usize, huge_page: Option<bool>) -> io::Result<Self> {
        let size = num_frames.checked_mul(frame_size).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame pool of {num_frames} x {frame_size} bytes overflows"),
            )
        })?;
        let mmap = OwnedMmap::anonymous(size, huge_page)
            .map_err(|e| io::Error::other(format!("Failed to allocate frame pool: {e}")))?;
        Ok(Self {
            mmap,
            num_frames,
            frame_size,
        })
    }

    /// Returns the start of frame `index`.
    ///
    /// The caller guarantees `index < num_frames`.
    #[inline]
    pub fn at(&self, index: usize) -> *mut u8 {
        debug_assert!(index < self.num_frames);
        unsafe { self.mmap.as_u8_ptr().add(index * self.frame_size) }
    }

    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Size of the backing mapping, rounded up to the page size.
    pub fn mapped_len(&self) -> usize {
        self.mmap.len()
    }
}
