//! Cache Store Module
//!
//! Main cache engine combining sharded storage with a pluggable eviction
//! policy, TTL expiration and a background expiration sweeper.
//!
//! # Concurrency
//! - Entries live in a `DashMap`, so lookups on different keys proceed in
//!   parallel without a global lock.
//! - The eviction policy sits behind its own mutex. Every mutation of the
//!   map (insert, eviction, expiry removal, delete) happens while holding
//!   it, which keeps the policy's tracking and the map in step and makes
//!   the capacity check and insertion of a `put` atomic.
//! - A `get` holds a map guard only for the lookup itself and takes the
//!   policy lock afterwards, for the O(1) access notification.
//! - Lock order is always policy, then map shard.
//!
//! Because every write holds the policy mutex, that mutex acts as a global
//! write lock: puts and removes from all threads run one at a time. This is
//! a throughput bottleneck for write-heavy workloads; read-heavy workloads
//! are unaffected beyond the brief `on_access` call.

use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cache::clock::{Clock, SystemClock, Timestamp};
use crate::cache::{CacheEntry, CacheStats, CacheStatsSnapshot, EvictionPolicy, LruPolicy};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{spawn_sweeper, SweeperHandle};

// == Shared State ==
/// State shared between a cache and its background sweeper.
pub(crate) struct Shared<K, V, P> {
    /// Key-value storage
    store: DashMap<K, CacheEntry<V>>,
    /// Eviction policy, serialized behind its own lock
    policy: Mutex<P>,
    /// Performance statistics
    stats: CacheStats,
    clock: Arc<dyn Clock>,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Held for each background sweep pass; false once shut down
    sweep_gate: Mutex<bool>,
}

impl<K, V, P> Shared<K, V, P>
where
    K: Hash + Eq + Clone,
    P: EvictionPolicy<K, V>,
{
    /// Runs one background sweep pass unless the cache has shut down.
    ///
    /// Returns `None` once shut down.
    pub(crate) fn sweep_if_active(&self) -> Option<usize> {
        let active = self.sweep_gate.lock();
        if !*active {
            return None;
        }
        Some(self.remove_expired())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Expired keys are snapshotted first and then removed one at a time,
    /// so no lock is held for the whole scan.
    fn remove_expired(&self) -> usize {
        let now = self.clock.now();
        let expired_keys: Vec<K> = self
            .store
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        expired_keys
            .iter()
            .filter(|key| self.remove_if_expired(key, now))
            .count()
    }

    /// Removes `key` if it is still expired at `now`.
    ///
    /// A racing overwrite leaves a fresh entry behind, which stays.
    fn remove_if_expired(&self, key: &K, now: Timestamp) -> bool {
        let mut policy = self.policy.lock();
        let removed = self
            .store
            .remove_if(key, |_, entry| entry.is_expired_at(now))
            .is_some();

        if removed {
            policy.on_remove(key);
            self.stats.record_expirations(1);
        }
        removed
    }
}

enum Lookup<V> {
    Missing,
    Expired,
    Hit(V),
}

// == Cache ==
/// Thread-safe, capacity-bounded cache with TTL expiration.
///
/// `Cache` is `Sync`; share it between threads with an `Arc`.
///
/// # Example
/// ```
/// use mini_cache::Cache;
///
/// let cache = Cache::lru(2);
/// cache.put("a", 1, 0);
/// cache.put("b", 2, 0);
/// assert_eq!(cache.get(&"a"), Some(1));
///
/// // "b" is now least recently used
/// cache.put("c", 3, 0);
/// assert_eq!(cache.get(&"b"), None);
/// ```
pub struct Cache<K, V, P = LruPolicy<K>> {
    shared: Arc<Shared<K, V, P>>,
    /// TTL in milliseconds used by `insert`
    default_ttl_millis: i64,
    sweeper: Mutex<Option<SweeperHandle>>,
}

impl<K, V> Cache<K, V, LruPolicy<K>>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a least-recently-used cache holding up to `max_size` entries.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn lru(max_size: usize) -> Self {
        Self::new(max_size, LruPolicy::new())
    }
}

impl<K, V, P> Cache<K, V, P>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    P: EvictionPolicy<K, V> + 'static,
{
    // == Constructor ==
    /// Creates a cache with the default sweep interval.
    ///
    /// When called inside a Tokio runtime, a background sweeper is started
    /// on it. Outside one, expired entries are only removed lazily by `get`
    /// and by `cleanup_expired`.
    ///
    /// # Panics
    /// Panics if `max_size` is zero.
    pub fn new(max_size: usize, policy: P) -> Self {
        assert!(max_size > 0, "cache max_size must be greater than zero");
        Self::build(CacheConfig::new(max_size), policy, Arc::new(SystemClock::new()))
    }

    /// Creates a cache from a validated configuration.
    pub fn with_config(config: CacheConfig, policy: P) -> Result<Self> {
        Self::with_clock(config, policy, Arc::new(SystemClock::new()))
    }

    /// Creates a cache reading time from `clock`.
    pub fn with_clock(config: CacheConfig, policy: P, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, policy, clock))
    }

    fn build(config: CacheConfig, policy: P, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(Shared {
            store: DashMap::new(),
            policy: Mutex::new(policy),
            stats: CacheStats::new(),
            clock,
            max_size: config.max_size,
            sweep_gate: Mutex::new(true),
        });
        let sweeper = spawn_sweeper(&shared, config.sweep_interval);

        Self {
            shared,
            default_ttl_millis: config.default_ttl_millis,
            sweeper: Mutex::new(sweeper),
        }
    }

    // == Put ==
    /// Stores a key-value pair.
    ///
    /// If the key already exists, the value is overwritten and TTL is reset;
    /// this is not an eviction. If the cache is at capacity, the policy's
    /// candidate is evicted first.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_millis` - TTL in milliseconds; zero or negative never expires
    pub fn put(&self, key: K, value: V, ttl_millis: i64) {
        let shared = &*self.shared;
        let mut policy = shared.policy.lock();
        let now = shared.clock.now();

        if !shared.store.contains_key(&key) && shared.store.len() >= shared.max_size {
            self.evict_one(&mut *policy, now);
        }

        let entry = CacheEntry::new(value, ttl_millis, now);
        policy.on_add(&key, entry.value());
        shared.store.insert(key, entry);

        shared.stats.record_put();
    }

    /// Stores a key-value pair with the configured default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.put(key, value, self.default_ttl_millis);
    }

    /// Frees one slot. Must be called with the policy lock held.
    ///
    /// A candidate the map no longer holds counts as no candidate at all.
    /// Without a usable candidate the put may leave the cache one entry
    /// over capacity, never more: once already over, any resident key goes.
    fn evict_one(&self, policy: &mut P, now: Timestamp) {
        let shared = &*self.shared;

        if let Some(candidate) = policy.evict_candidate() {
            if self.remove_for_capacity(policy, &candidate, now) {
                return;
            }
            debug!("Eviction candidate was already removed, nothing evicted");
        }

        if shared.store.len() > shared.max_size {
            let resident = shared.store.iter().next().map(|entry| entry.key().clone());
            if let Some(resident) = resident {
                self.remove_for_capacity(policy, &resident, now);
            }
        } else {
            warn!(
                max_size = shared.max_size,
                "Cache full and policy offered no usable eviction candidate, inserting anyway"
            );
        }
    }

    /// Removes `key` to make room, returning false if it was not present.
    ///
    /// An entry that had already expired is accounted as an expiration.
    fn remove_for_capacity(&self, policy: &mut P, key: &K, now: Timestamp) -> bool {
        let shared = &*self.shared;

        policy.on_remove(key);
        let Some((_, entry)) = shared.store.remove(key) else {
            return false;
        };

        if entry.is_expired_at(now) {
            shared.stats.record_expirations(1);
            debug!("Removed an expired entry to stay within capacity");
        } else {
            shared.stats.record_eviction();
            debug!("Evicted one entry to stay within capacity");
        }
        true
    }

    // == Get ==
    /// Retrieves a copy of the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or expired. Expired entries are
    /// removed and counted as misses.
    pub fn get(&self, key: &K) -> Option<V> {
        let shared = &*self.shared;
        let now = shared.clock.now();

        let lookup = match shared.store.get(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired_at(now) => Lookup::Expired,
            Some(entry) => Lookup::Hit(entry.read(now).clone()),
        };

        match lookup {
            Lookup::Missing => {
                shared.stats.record_miss();
                None
            }
            Lookup::Expired => {
                shared.remove_if_expired(key, now);
                shared.stats.record_miss();
                None
            }
            Lookup::Hit(value) => {
                shared.policy.lock().on_access(key, &value);
                shared.stats.record_hit();
                Some(value)
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key. Not counted as an eviction.
    ///
    /// Returns true if an entry was removed.
    pub fn remove(&self, key: &K) -> bool {
        let shared = &*self.shared;
        let mut policy = shared.policy.lock();

        let removed = shared.store.remove(key).is_some();
        if removed {
            policy.on_remove(key);
        }
        removed
    }

    /// Returns true if `key` holds a non-expired entry.
    ///
    /// Touches neither statistics nor the eviction policy.
    pub fn contains_key(&self, key: &K) -> bool {
        let now = self.shared.clock.now();
        self.shared
            .store
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    /// Removes all expired entries now, without waiting for the sweeper.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        self.shared.remove_expired()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.shared.stats.snapshot(self.len())
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included until
    /// they are removed.
    ///
    /// Shards are counted one after another, so while other threads are
    /// writing the result is approximate and may briefly exceed `max_size`.
    pub fn len(&self) -> usize {
        self.shared.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.shared.max_size
    }
}

impl<K, V, P> Cache<K, V, P> {
    // == Shutdown ==
    /// Stops the background sweeper.
    ///
    /// Waits for a sweep pass in progress; once this returns no pass runs
    /// again. Calling it more than once is harmless. Reads and writes keep
    /// working afterwards.
    pub fn shutdown(&self) {
        *self.shared.sweep_gate.lock() = false;

        if let Some(sweeper) = self.sweeper.lock().take() {
            sweeper.stop();
        }
    }
}

impl<K, V, P> Drop for Cache<K, V, P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
