//! Live connection accounting.
//!
//! The accept loop takes one [`ConnectionGuard`] per accepted socket and holds
//! it for the connection task's lifetime, so the open event strictly precedes
//! any request handling on that socket and the close event fires exactly once
//! even on error paths. Membership in the tracked set gates the count update,
//! so a duplicate or unmatched release is a no-op and the gauge can never go
//! negative.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashSet;

use crate::obs::metrics::GaugeVec;

pub struct ConnectionTracker {
    live: DashSet<u64>,
    open: AtomicU64,
    seq: AtomicU64,
    gauge: Arc<GaugeVec>,
    color: String,
}

impl ConnectionTracker {
    pub fn new(gauge: Arc<GaugeVec>, color: String) -> Arc<Self> {
        let tracker = Arc::new(Self {
            live: DashSet::new(),
            open: AtomicU64::new(0),
            seq: AtomicU64::new(1),
            gauge,
            color,
        });
        // publish the series at 0 before the first connection
        tracker.set_gauge(0);
        tracker
    }

    /// Record a newly accepted connection. The returned guard releases it on drop.
    pub fn track(self: &Arc<Self>) -> ConnectionGuard {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.live.insert(id);
        let now = self.open.fetch_add(1, Ordering::AcqRel) + 1;
        self.set_gauge(now);
        ConnectionGuard { tracker: Arc::clone(self), id }
    }

    /// Record a closed connection. Safe to call more than once per id.
    pub fn release(&self, id: u64) {
        if self.live.remove(&id).is_none() {
            return;
        }
        let now = match self.open.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
            Some(n.saturating_sub(1))
        }) {
            Ok(prev) | Err(prev) => prev.saturating_sub(1),
        };
        self.set_gauge(now);
    }

    /// Number of currently tracked connections.
    pub fn open_count(&self) -> u64 {
        self.open.load(Ordering::Acquire)
    }

    fn set_gauge(&self, v: u64) {
        self.gauge.set(&[("color", self.color.as_str())], v as i64);
    }
}

/// Handle to one tracked connection.
pub struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
    id: u64,
}

impl ConnectionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.tracker.release(self.id);
    }
}
