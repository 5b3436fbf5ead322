//! Cache Statistics Module
//!
//! Counts how intercepted requests were answered. Counters are atomic so
//! concurrent fetch handlers can record without taking a lock.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Live counters updated by the worker.
#[derive(Debug, Default)]
pub struct CacheStats {
    network: AtomicU64,
    cache_hits: AtomicU64,
    offline_fallbacks: AtomicU64,
    misses: AtomicU64,
    passthroughs: AtomicU64,
    store_writes: AtomicU64,
    store_failures: AtomicU64,
}

/// Point-in-time copy of [`CacheStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Requests answered live from the network
    pub network: u64,
    /// Requests answered from the current generation while offline
    pub cache_hits: u64,
    /// Navigations answered with the offline fallback document
    pub offline_fallbacks: u64,
    /// Requests that failed with no response available
    pub misses: u64,
    /// Requests forwarded without interception
    pub passthroughs: u64,
    /// Successful background cache writes
    pub store_writes: u64,
    /// Background cache writes that were dropped
    pub store_failures: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_network(&self) {
        self.network.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_offline_fallback(&self) {
        self.offline_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_passthrough(&self) {
        self.passthroughs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_write(&self) {
        self.store_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    // == Snapshot ==
    /// Reads every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            network: self.network.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            offline_fallbacks: self.offline_fallbacks.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            passthroughs: self.passthroughs.load(Ordering::Relaxed),
            store_writes: self.store_writes.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    // == Offline Rate ==
    /// Share of intercepted requests answered without the network.
    ///
    /// Returns 0.0 if no intercepted requests have been made.
    pub fn offline_rate(&self) -> f64 {
        let offline = self.cache_hits + self.offline_fallbacks;
        let total = self.network + offline + self.misses;
        if total == 0 {
            0.0
        } else {
            offline as f64 / total as f64
        }
    }
}
