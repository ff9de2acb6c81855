//! Cache Configuration
//!
//! Budgets and policy thresholds for a [`CacheStore`](super::CacheStore).

use super::{
    DEFAULT_COLD_ACCESS_THRESHOLD, DEFAULT_ENTRY_OVERHEAD, DEFAULT_EXPIRY_MAX_AGE_MS,
    DEFAULT_MAX_CACHE_SIZE, DEFAULT_MAX_RESOURCE_SIZE, DEFAULT_STALE_WINDOW_MS,
};

/// Construction-time settings for the cache core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Total byte ceiling, overhead included
    pub max_cache_size: usize,
    /// Per-resource payload cap
    pub max_resource_size: usize,
    /// Bookkeeping bytes charged per entry on top of its payload
    pub entry_overhead: usize,
    /// Idle time after which a same-tier entry may be displaced
    pub stale_window_ms: u64,
    /// Same-tier entries touched at least this often are never displaced
    pub cold_access_threshold: u32,
    /// Idle time after which non-critical entries are expired by cleanup
    pub expiry_max_age_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
            entry_overhead: DEFAULT_ENTRY_OVERHEAD,
            stale_window_ms: DEFAULT_STALE_WINDOW_MS,
            cold_access_threshold: DEFAULT_COLD_ACCESS_THRESHOLD,
            expiry_max_age_ms: DEFAULT_EXPIRY_MAX_AGE_MS,
        }
    }
}

impl CacheConfig {
    /// Default configuration with a different total budget.
    pub fn with_max_cache_size(max_cache_size: usize) -> Self {
        Self {
            max_cache_size,
            ..Self::default()
        }
    }
}
