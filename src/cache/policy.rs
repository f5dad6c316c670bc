//! Eviction Policy Module
//!
//! The contract between a cache and the strategy that picks which key to
//! drop when the cache is full.

/// Decides which key a full cache should evict.
///
/// The cache serializes every call behind a lock dedicated to the policy,
/// so implementations need no internal synchronization.
///
/// Callbacks must not fail or block. A policy that cannot make use of a
/// notification simply ignores it.
pub trait EvictionPolicy<K, V>: Send {
    /// Called once per successful insertion, including overwrites of an
    /// existing key.
    fn on_add(&mut self, key: &K, value: &V);

    /// Called once per successful, non-expired read.
    fn on_access(&mut self, key: &K, value: &V);

    /// Nominates the key to evict next without forgetting it.
    ///
    /// `None` means the policy has nothing to suggest; the cache then goes
    /// ahead with the insertion and temporarily holds one extra entry.
    fn evict_candidate(&mut self) -> Option<K>;

    /// Called when the cache has removed `key`, whether by eviction,
    /// expiration or an explicit remove. Not called on overwrite.
    fn on_remove(&mut self, _key: &K) {}
}
