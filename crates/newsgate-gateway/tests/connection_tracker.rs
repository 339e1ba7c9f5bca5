//! Connection lifecycle accounting.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::{Arc, Barrier};

use newsgate_gateway::obs::metrics::GaugeVec;
use newsgate_gateway::transport::tracker::ConnectionTracker;

const COLOR: &[(&str, &str)] = &[("color", "blue")];

fn tracker() -> (Arc<ConnectionTracker>, Arc<GaugeVec>) {
    let gauge = GaugeVec::new("active_connections", "Active TCP connections");
    let tracker = ConnectionTracker::new(Arc::clone(&gauge), "blue".to_string());
    (tracker, gauge)
}

#[test]
fn open_and_close_move_the_gauge() {
    let (tracker, gauge) = tracker();
    assert_eq!(gauge.get(COLOR), Some(0));

    let a = tracker.track();
    let b = tracker.track();
    assert_eq!(tracker.open_count(), 2);
    assert_eq!(gauge.get(COLOR), Some(2));

    drop(a);
    assert_eq!(tracker.open_count(), 1);
    assert_eq!(gauge.get(COLOR), Some(1));

    drop(b);
    assert_eq!(tracker.open_count(), 0);
    assert_eq!(gauge.get(COLOR), Some(0));
}

#[test]
fn duplicate_close_does_not_double_decrement() {
    let (tracker, gauge) = tracker();

    let a = tracker.track();
    let b = tracker.track();
    let a_id = a.id();

    // close fires twice for the same connection: explicit release plus drop
    tracker.release(a_id);
    tracker.release(a_id);
    drop(a);

    assert_eq!(tracker.open_count(), 1);
    assert_eq!(gauge.get(COLOR), Some(1));
    drop(b);
    assert_eq!(gauge.get(COLOR), Some(0));
}

#[test]
fn close_without_open_is_a_noop() {
    let (tracker, gauge) = tracker();
    tracker.release(999);
    assert_eq!(tracker.open_count(), 0);
    assert_eq!(gauge.get(COLOR), Some(0));
}

#[test]
fn concurrent_open_then_close() {
    let (tracker, gauge) = tracker();
    let opened = Arc::new(Barrier::new(51));
    let closing = Arc::new(Barrier::new(51));

    std::thread::scope(|s| {
        for _ in 0..50 {
            let tracker = Arc::clone(&tracker);
            let opened = Arc::clone(&opened);
            let closing = Arc::clone(&closing);
            s.spawn(move || {
                let _guard = tracker.track();
                opened.wait();
                closing.wait();
            });
        }

        opened.wait();
        assert_eq!(tracker.open_count(), 50);
        assert_eq!(gauge.get(COLOR), Some(50));
        closing.wait();
    });

    assert_eq!(tracker.open_count(), 0);
    assert_eq!(gauge.get(COLOR), Some(0));
}
