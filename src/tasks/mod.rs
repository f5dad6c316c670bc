//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the life of a cache.
//!
//! # Tasks
//! - TTL Sweeper: Removes expired cache entries at configured intervals

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;
pub use sweeper::SweeperHandle;
