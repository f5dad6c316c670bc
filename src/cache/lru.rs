//! LRU Policy Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::hash::Hash;

use hashlink::LinkedHashMap;

use crate::cache::policy::EvictionPolicy;

// == LRU Policy ==
/// Tracks access order for LRU eviction strategy.
///
/// Keys are stored in a linked hash map where:
/// - Front = Least recently used
/// - Back = Most recently used
#[derive(Debug)]
pub struct LruPolicy<K> {
    /// Order of keys by access time
    order: LinkedHashMap<K, ()>,
}

impl<K: Hash + Eq> LruPolicy<K> {
    // == Constructor ==
    /// Creates a new empty LRU policy.
    pub fn new() -> Self {
        Self {
            order: LinkedHashMap::new(),
        }
    }

    /// Creates a policy with room for `capacity` keys before reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: LinkedHashMap::with_capacity(capacity),
        }
    }

    // == Peek Oldest ==
    /// Returns the least recently used key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.front().map(|(key, _)| key)
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.order.contains_key(key)
    }
}

impl<K: Hash + Eq> Default for LruPolicy<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> EvictionPolicy<K, V> for LruPolicy<K>
where
    K: Hash + Eq + Clone + Send,
{
    /// Marks a key as most recently used, tracking it if new.
    fn on_add(&mut self, key: &K, _value: &V) {
        self.order.remove(key);
        self.order.insert(key.clone(), ());
    }

    /// Moves a tracked key to the most recent end.
    ///
    /// Untracked keys are ignored: a racing removal already retired them.
    fn on_access(&mut self, key: &K, _value: &V) {
        if self.order.remove(key).is_some() {
            self.order.insert(key.clone(), ());
        }
    }

    fn evict_candidate(&mut self) -> Option<K> {
        self.peek_oldest().cloned()
    }

    fn on_remove(&mut self, key: &K) {
        self.order.remove(key);
    }
}
