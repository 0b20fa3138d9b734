// Queue counters (observability side channel)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Which side of the queue is blocking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Producer,
    Consumer,
}

#[derive(Debug, Default)]
pub(crate) struct QueueStats {
    submitted: AtomicU64,
    taken: AtomicU64,
    producer_waits: AtomicU64,
    consumer_waits: AtomicU64,
}

impl QueueStats {
    pub(crate) fn record_submit(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_take(&self) {
        self.taken.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one park on the notifier (a wake-up and recheck may follow)
    pub(crate) fn record_wait(&self, side: Side) {
        let counter = match side {
            Side::Producer => &self.producer_waits,
            Side::Consumer => &self.consumer_waits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            taken: self.taken.load(Ordering::Relaxed),
            producer_waits: self.producer_waits.load(Ordering::Relaxed),
            consumer_waits: self.consumer_waits.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the queue counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub submitted: u64,
    pub taken: u64,
    pub producer_waits: u64,
    pub consumer_waits: u64,
}
