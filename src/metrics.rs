//! Monotonic run counters, safe under concurrent increment.
//!
//! The counter set is an injected handle rather than process-global state:
//! the orchestrator creates it at run start, every stage and backend
//! increments through the shared [`Arc`], and the orchestrator flushes it at
//! completion. Embedding applications that drive the stages directly can
//! supply their own handle.

use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// A single monotonic counter
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Increment by one
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Current value
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counter set for one acquisition run
#[derive(Debug, Default)]
pub struct Counters {
    /// Partitions fetched successfully
    pub fetch_success: Counter,
    /// Partitions whose retrieval failed (isolated, not retried)
    pub fetch_failure: Counter,
    /// Remote requests observed entering the active state
    pub requests_active: Counter,
    /// Remote requests observed completing
    pub requests_complete: Counter,
}

/// Point-in-time copy of the counter set, for reporting
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    /// Partitions fetched successfully
    pub fetch_success: u64,
    /// Partitions whose retrieval failed
    pub fetch_failure: u64,
    /// Remote requests observed entering the active state
    pub requests_active: u64,
    /// Remote requests observed completing
    pub requests_complete: u64,
}

impl Counters {
    /// Create a fresh counter set behind a shareable handle
    pub fn handle() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Read all counters at once
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            fetch_success: self.fetch_success.get(),
            fetch_failure: self.fetch_failure.get(),
            requests_active: self.requests_active.get(),
            requests_complete: self.requests_complete.get(),
        }
    }

    /// Log final totals and return them. Called once by the orchestrator at
    /// the end of a run.
    pub fn flush(&self) -> CounterSnapshot {
        let snapshot = self.snapshot();
        tracing::info!(
            fetch_success = snapshot.fetch_success,
            fetch_failure = snapshot.fetch_failure,
            requests_active = snapshot.requests_active,
            requests_complete = snapshot.requests_complete,
            "run counters"
        );
        snapshot
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero_and_increment() {
        let counters = Counters::handle();
        assert_eq!(counters.fetch_success.get(), 0);

        counters.fetch_success.inc();
        counters.fetch_success.inc();
        counters.fetch_failure.inc();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.fetch_success, 2);
        assert_eq!(snapshot.fetch_failure, 1);
        assert_eq!(snapshot.requests_active, 0);
        assert_eq!(snapshot.requests_complete, 0);
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let counters = Counters::handle();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let counters = Arc::clone(&counters);
            handles.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    counters.fetch_success.inc();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(counters.fetch_success.get(), 8000);
    }
}
