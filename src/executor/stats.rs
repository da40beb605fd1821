use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

/// Process-wide render counters using lock-free atomic operations.
///
/// All counters use `Ordering::SeqCst` so a snapshot taken after a caller
/// observed its result always includes that result's increment.
#[derive(Debug, Default)]
pub struct StatsTracker {
    served_requests: AtomicU64,
    error_count: AtomicU64,
}

impl StatsTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successful render
    pub fn record_served(&self) {
        self.served_requests.fetch_add(1, Ordering::SeqCst);
    }

    /// Count one failure surfaced to a caller
    pub fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::SeqCst);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            served_requests: self.served_requests.load(Ordering::SeqCst),
            error_count: self.error_count.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub served_requests: u64,
    pub error_count: u64,
}

impl StatsSnapshot {
    /// Requests that reached a terminal outcome
    #[must_use]
    pub fn total(&self) -> u64 {
        self.served_requests + self.error_count
    }
}

/// Log the counters every `interval` until the returned task is aborted
pub fn spawn_reporter(stats: Arc<StatsTracker>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let snapshot = stats.snapshot();
            info!(
                served_requests = snapshot.served_requests,
                error_count = snapshot.error_count,
                "Served Requests: {}, Error Count: {}",
                snapshot.served_requests,
                snapshot.error_count
            );
        }
    })
}
