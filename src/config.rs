//! Configuration Module
//!
//! Handles loading and validating cache configuration.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{CacheError, Result};

/// Default maximum number of entries.
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Default period between background expiration sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Longest accepted period between background sweeps.
pub const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// Period between background expiration sweeps
    #[serde(rename = "sweep_interval_ms", deserialize_with = "duration_from_millis")]
    pub sweep_interval: Duration,
    /// TTL in milliseconds used by `Cache::insert`; zero or negative never expires
    #[serde(rename = "default_ttl_ms")]
    pub default_ttl_millis: i64,
}

impl CacheConfig {
    /// Creates a configuration for `max_size` entries with default settings.
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::default()
        }
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_default_ttl(mut self, ttl_millis: i64) -> Self {
        self.default_ttl_millis = ttl_millis;
        self
    }

    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_SIZE` - Maximum cache entries (default: 1000)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 60000)
    /// - `CACHE_DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 0, no expiration)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: env::var("CACHE_MAX_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_size),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.sweep_interval),
            default_ttl_millis: env::var("CACHE_DEFAULT_TTL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_millis),
        }
    }

    /// Checks that the configuration can back a cache.
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::InvalidConfig(
                "max_size must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be greater than zero".to_string(),
            ));
        }
        if self.sweep_interval > MAX_SWEEP_INTERVAL {
            return Err(CacheError::InvalidConfig(format!(
                "sweep_interval must be at most {} ms",
                MAX_SWEEP_INTERVAL.as_millis()
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            default_ttl_millis: 0,
        }
    }
}

fn duration_from_millis<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_millis)
}
