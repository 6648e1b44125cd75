//! # Poll Interval Tests
//!
//! Two-in-a-row hysteresis and bound clamping.

use proptest::prelude::*;
use rstest::rstest;

use mrsim_core::io::PollInterval;

fn settled_at_min() -> PollInterval {
    let mut interval = PollInterval::new(100, 10_000, 100);
    for _ in 0..200 {
        interval.record(true);
    }
    interval
}

#[test]
fn test_starts_at_max() {
    assert_eq!(PollInterval::new(100, 10_000, 100).current(), 10_000);
}

#[test]
fn test_two_busy_polls_shorten() {
    let mut interval = PollInterval::new(100, 10_000, 100);
    interval.record(true);
    assert_eq!(interval.current(), 10_000);
    interval.record(true);
    assert_eq!(interval.current(), 9_900);
}

#[test]
fn test_two_idle_polls_lengthen() {
    let mut interval = settled_at_min();
    assert_eq!(interval.current(), 100);
    interval.record(false);
    assert_eq!(interval.current(), 100);
    interval.record(false);
    assert_eq!(interval.current(), 200);
}

#[rstest]
#[case::busy_after_idle(false, true)]
#[case::idle_after_busy(true, false)]
fn test_single_change_holds(#[case] before: bool, #[case] now: bool) {
    let mut interval = PollInterval::new(100, 10_000, 100);
    for _ in 0..10 {
        interval.record(true);
    }
    interval.record(before);
    let held = interval.current();
    interval.record(now);
    assert_eq!(interval.current(), held);
}

#[test]
fn test_clamped_at_both_ends() {
    let mut interval = settled_at_min();
    assert_eq!(interval.current(), 100);
    for _ in 0..500 {
        interval.record(false);
    }
    assert_eq!(interval.current(), 10_000);
}

#[test]
fn test_only_every_nth_call_is_due() {
    let mut interval = PollInterval::new(100, 10_000, 100);
    let due = (0..30_000).filter(|_| interval.due()).count();
    assert_eq!(due, 3);
}

proptest! {
    /// Busy twice strictly shortens (or stays at min); idle twice strictly lengthens (or
    /// stays at max); the interval never leaves its bounds.
    #[test]
    fn prop_hysteresis(history in prop::collection::vec(any::<bool>(), 0..64), step in 1u32..500) {
        let mut interval = PollInterval::new(100, 10_000, step);
        let mut last = false;
        for busy in history {
            let before = interval.current();
            interval.record(busy);
            let after = interval.current();
            prop_assert!((100..=10_000).contains(&after));
            match (last, busy) {
                (true, true) => prop_assert!(after < before || after == 100),
                (false, false) => prop_assert!(after > before || after == 10_000),
                _ => prop_assert_eq!(after, before),
            }
            last = busy;
        }
    }
}
