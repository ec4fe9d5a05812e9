//! Ingestion counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the ingestion loop and readable from any thread.
#[derive(Debug, Default)]
pub struct IngestStats {
    received: AtomicU64,
    decode_failures: AtomicU64,
    submitted: AtomicU64,
    submit_failures: AtomicU64,
}

/// Point-in-time copy of [`IngestStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Messages taken from the queue.
    pub received: u64,
    /// Messages skipped because they could not be decoded.
    pub decode_failures: u64,
    /// Records acknowledged by the index engine.
    pub submitted: u64,
    /// Records dropped because the submission failed.
    pub submit_failures: u64,
}

impl IngestStats {
    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_submit_failure(&self) {
        self.submit_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            submitted: self.submitted.load(Ordering::Relaxed),
            submit_failures: self.submit_failures.load(Ordering::Relaxed),
        }
    }
}
