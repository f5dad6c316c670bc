//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and pluggable eviction.

mod clock;
mod entry;
mod lru;
mod policy;
mod stats;
pub(crate) mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock, Timestamp, NEVER};
pub use entry::CacheEntry;
pub use lru::LruPolicy;
pub use policy::EvictionPolicy;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::Cache;
