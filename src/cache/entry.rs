//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::clock::{Timestamp, NEVER};

// == Cache Entry ==
/// A stored value plus its expiration deadline and access metadata.
///
/// The value and deadlines are fixed at construction. Access metadata is
/// atomic so it can be bumped through a shared reference.
#[derive(Debug)]
pub struct CacheEntry<V> {
    value: V,
    /// Creation timestamp (milliseconds)
    created_at: Timestamp,
    /// Expiration timestamp, `NEVER` when the entry has no TTL
    expires_at: Timestamp,
    last_access: AtomicU64,
    access_count: AtomicU64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl_millis` - TTL in milliseconds; zero or negative never expires
    /// * `now` - Current time from the cache's clock
    pub fn new(value: V, ttl_millis: i64, now: Timestamp) -> Self {
        let expires_at = if ttl_millis > 0 {
            now.saturating_add(ttl_millis as u64)
        } else {
            NEVER
        };

        Self {
            value,
            created_at: now,
            expires_at,
            last_access: AtomicU64::new(now),
            access_count: AtomicU64::new(0),
        }
    }

    // == Read ==
    /// Returns the value and records one access at `now`.
    pub fn read(&self, now: Timestamp) -> &V {
        // A racing reader may have stored a later time already.
        self.last_access.fetch_max(now, Ordering::Relaxed);
        self.access_count.fetch_add(1, Ordering::Relaxed);
        &self.value
    }

    /// Returns the value without touching access metadata.
    pub fn value(&self) -> &V {
        &self.value
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// Boundary condition: a read exactly at the deadline is still valid,
    /// the entry expires once `now` is strictly past it.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }

    /// Returns true if the entry was created with a TTL.
    pub fn expires(&self) -> bool {
        self.expires_at != NEVER
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired (TTL elapsed)
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry has no TTL (never expires)
    pub fn ttl_remaining_ms(&self, now: Timestamp) -> Option<u64> {
        if !self.expires() {
            return None;
        }
        Some(self.expires_at.saturating_sub(now))
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    pub fn last_access(&self) -> Timestamp {
        self.last_access.load(Ordering::Relaxed)
    }

    pub fn access_count(&self) -> u64 {
        self.access_count.load(Ordering::Relaxed)
    }
}
