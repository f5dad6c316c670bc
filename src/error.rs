//! Error types for the cache
//!
//! Provides unified error handling using thiserror.
//!
//! Lookups and inserts never fail; a missing or expired key is an empty
//! result, not an error. Only building a cache from bad settings does.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
