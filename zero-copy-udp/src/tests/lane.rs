#![cfg(test)]

use crate::lane::{RecvLane, SendLane};
use std::time::Duration;

#[test]
fn every_frame_starts_free() {
    let lane = RecvLane::new(4, 64, Some(false)).unwrap();
    assert_eq!(lane.num_frames(), 4);
    assert_eq!(lane.frame_size(), 64);
    assert_eq!(lane.num_free(), 4);
    for index in 0..4 {
        assert!(!lane.is_on_loan(index));
    }
}

#[test]
fn frames_do_not_overlap() {
    let lane = SendLane::new(3, 100, Some(false)).unwrap();
    let first = lane.frame(0) as usize;
    assert_eq!(lane.frame(1) as usize - first, 100);
    assert_eq!(lane.frame(2) as usize - first, 200);
}

#[test]
fn on_loan_never_exceeds_pool_depth() {
    let lane = RecvLane::new(3, 16, Some(false)).unwrap();
    let lent: Vec<u32> = std::iter::from_fn(|| lane.lend_with_haste()).collect();
    assert_eq!(lent.len(), 3);
    assert!(lent.iter().all(|&i| lane.is_on_loan(i)));
    assert_eq!(lane.lend_with_haste(), None);
    assert_eq!(lane.lend_with_timed_wait(Duration::from_millis(10)), None);

    assert!(lane.give_back(lent[1]));
    assert_eq!(lane.lend_with_haste(), Some(lent[1]));
}

#[test]
fn give_back_is_idempotent() {
    let lane = SendLane::new(2, 16, Some(false)).unwrap();
    let index = lane.lend_with_haste().unwrap();
    assert_eq!(lane.num_free(), 1);
    assert!(lane.give_back(index));
    assert!(!lane.give_back(index));
    assert!(!lane.retire(index));
    assert_eq!(lane.num_free(), 2);
    assert_eq!(lane.evictions(), 0);
}

#[test]
fn free_frames_cannot_be_returned() {
    let lane = RecvLane::new(2, 16, Some(false)).unwrap();
    assert!(!lane.give_back(0));
    assert_eq!(lane.num_free(), 2);
}

#[test]
fn rejects_empty_pool() {
    let err = RecvLane::new(0, 16, Some(false)).err().unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn names_follow_direction() {
    assert_eq!(RecvLane::name(), "recv");
    assert_eq!(SendLane::name(), "send");
}
