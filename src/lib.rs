//! Mini Cache - A thread-safe in-memory cache
//!
//! Bounded entry count, pluggable eviction policy (LRU by default),
//! per-entry TTL expiration with a background sweeper, and lock-free
//! hit/miss statistics.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{
    Cache, CacheEntry, CacheStatsSnapshot, Clock, EvictionPolicy, LruPolicy, ManualClock,
    SystemClock,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
