//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Cache Stats ==
/// Lock-free cache counters, shared by every caller of a cache.
///
/// Counters only ever grow; there is no reset.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a lookup that found nothing, or only an expired entry.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_put(&self) {
        self.puts.fetch_add(1, Ordering::Relaxed);
    }

    /// Records an entry removed to stay within capacity.
    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Records `count` entries removed because their TTL elapsed.
    pub fn record_expirations(&self, count: u64) {
        if count > 0 {
            self.expirations.fetch_add(count, Ordering::Relaxed);
        }
    }

    // == Snapshot ==
    /// Reads every counter. Not linearizable across counters.
    ///
    /// # Arguments
    /// * `entries` - Current number of entries in the cache
    pub fn snapshot(&self, entries: usize) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);

        CacheStatsSnapshot {
            hits,
            misses,
            puts: self.puts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            entries,
            hit_rate: hit_rate(hits, misses),
        }
    }
}

// == Cache Stats Snapshot ==
/// Point-in-time copy of a cache's counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStatsSnapshot {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of completed puts, overwrites included
    pub puts: u64,
    /// Number of entries evicted to stay within capacity
    pub evictions: u64,
    /// Number of entries removed after their TTL elapsed
    pub expirations: u64,
    /// Number of entries in the cache when the snapshot was taken;
    /// approximate while other threads are writing
    pub entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

/// Returns hits / (hits + misses), or 0.0 if no requests have been made.
fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
