//! # Bounded Free-List Queue
//!
//! ## Purpose
//!
//! Tracks which frames of one direction are free to be lent out. The queue holds frame
//! indices in FIFO order and never grows past the capacity it was created with.
//!
//! ## How it works
//!
//! The indices live in a lock-free `crossbeam_queue::ArrayQueue` allocated once in
//! `with_capacity`, so pushes and pops never allocate. Only a timed waiter parks: it
//! sleeps on a condition variable that every push signals.
//!
//! Pushing onto a full queue evicts the oldest entry to make room. That can only happen
//! when a frame index is pushed that was never popped, which is a bookkeeping bug
//! rather than normal load, so the eviction is logged and counted instead of blocking
//! the caller that returns a frame.
//!
//! ## Main components
//!
//! - `FreeList`: the queue itself.
//! - `push_with_pop_on_full()`, `pop_with_haste()`, `pop_with_timed_wait()`.

use crossbeam_queue::ArrayQueue;
use parking_lot::{Condvar, Mutex};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub struct FreeList {
    queue: ArrayQueue<u32>,
    // guards nothing; orders a push against a waiter going to sleep
    wait_lock: Mutex<()>,
    not_empty: Condvar,
    evictions: AtomicU64,
}

impl FreeList {
    /// Creates an empty queue able to hold `capacity` indices.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> io::Result<Self> {
        if capacity == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "free-list capacity must be non-zero",
            ));
        }
        Ok(Self {
            queue: ArrayQueue::new(capacity),
            wait_lock: Mutex::new(()),
            not_empty: Condvar::new(),
            evictions: AtomicU64::new(0),
        })
    }

    /// Appends `index`, evicting the oldest entry when the queue is full.
    ///
    /// Returns the evicted index, if any.
    pub fn push_with_pop_on_full(&self, index: u32) -> Option<u32> {
        let evicted = self.queue.force_push(index);
        if let Some(old) = evicted {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            log::warn!("free-list full, evicted frame {old} to make room for frame {index}");
        }
        drop(self.wait_lock.lock());
        self.not_empty.notify_one();
        evicted
    }

    /// Pops the oldest index without waiting.
    pub fn pop_with_haste(&self) -> Option<u32> {
        self.queue.pop()
    }

    /// Pops the oldest index, waiting up to `timeout` for one to be pushed.
    pub fn pop_with_timed_wait(&self, timeout: Duration) -> Option<u32> {
        if let Some(index) = self.queue.pop() {
            return Some(index);
        }
        if timeout.is_zero() {
            return None;
        }
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.wait_lock.lock();
        loop {
            if let Some(index) = self.queue.pop() {
                return Some(index);
            }
            match deadline {
                Some(deadline) => {
                    if self.not_empty.wait_until(&mut guard, deadline).timed_out() {
                        return self.queue.pop();
                    }
                }
                None => self.not_empty.wait(&mut guard),
            }
        }
    }

    /// Number of indices currently queued.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Total number of entries dropped by `push_with_pop_on_full`.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }
}
