#![cfg(test)]

use crate::queue::FreeList;
use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn pops_in_push_order() {
    let queue = FreeList::with_capacity(4).unwrap();
    for i in [3, 1, 2] {
        assert_eq!(queue.push_with_pop_on_full(i), None);
    }
    assert_eq!(queue.len(), 3);
    assert_eq!(queue.pop_with_haste(), Some(3));
    assert_eq!(queue.pop_with_haste(), Some(1));
    assert_eq!(queue.pop_with_haste(), Some(2));
    assert_eq!(queue.pop_with_haste(), None);
    assert!(queue.is_empty());
}

#[test]
fn full_push_evicts_the_oldest_entry() {
    let queue = FreeList::with_capacity(2).unwrap();
    queue.push_with_pop_on_full(0);
    queue.push_with_pop_on_full(1);
    assert_eq!(queue.push_with_pop_on_full(2), Some(0));
    assert_eq!(queue.len(), queue.capacity());
    assert_eq!(queue.evictions(), 1);
    assert_eq!(queue.pop_with_haste(), Some(1));
    assert_eq!(queue.pop_with_haste(), Some(2));
}

#[test]
fn wraps_around_without_growing() {
    let queue = FreeList::with_capacity(3).unwrap();
    for round in 0..10u32 {
        queue.push_with_pop_on_full(round);
        queue.push_with_pop_on_full(round + 100);
        assert_eq!(queue.pop_with_haste(), Some(round));
        assert_eq!(queue.pop_with_haste(), Some(round + 100));
    }
    assert_eq!(queue.capacity(), 3);
    assert_eq!(queue.evictions(), 0);
}

#[test]
fn timed_wait_expires_on_empty_queue() {
    let queue = FreeList::with_capacity(1).unwrap();
    let start = Instant::now();
    assert_eq!(queue.pop_with_timed_wait(Duration::from_millis(50)), None);
    assert!(start.elapsed() >= Duration::from_millis(45));
    assert_eq!(queue.pop_with_timed_wait(Duration::ZERO), None);
}

#[test]
fn timed_wait_is_woken_by_push() {
    let queue = Arc::new(FreeList::with_capacity(1).unwrap());
    let pusher = {
        let queue = queue.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            queue.push_with_pop_on_full(7);
        })
    };
    let start = Instant::now();
    assert_eq!(queue.pop_with_timed_wait(Duration::from_secs(5)), Some(7));
    assert!(start.elapsed() < Duration::from_secs(5));
    pusher.join().unwrap();
}

#[test]
fn zero_capacity_is_rejected() {
    let err = FreeList::with_capacity(0).err().unwrap();
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[test]
fn concurrent_waiters_each_get_one_index() {
    let queue = Arc::new(FreeList::with_capacity(4).unwrap());
    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let queue = queue.clone();
            thread::spawn(move || queue.pop_with_timed_wait(Duration::from_secs(5)))
        })
        .collect();
    thread::sleep(Duration::from_millis(30));
    for i in 0..4 {
        queue.push_with_pop_on_full(i);
    }
    let mut got: Vec<u32> = waiters.into_iter().map(|w| w.join().unwrap().unwrap()).collect();
    got.sort_unstable();
    assert_eq!(got, [0, 1, 2, 3]);
    assert_eq!(queue.evictions(), 0);
}
