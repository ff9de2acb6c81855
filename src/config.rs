//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{
    CacheConfig, DEFAULT_COLD_ACCESS_THRESHOLD, DEFAULT_ENTRY_OVERHEAD,
    DEFAULT_EXPIRY_MAX_AGE_MS, DEFAULT_MAX_CACHE_SIZE, DEFAULT_MAX_RESOURCE_SIZE,
    DEFAULT_STALE_WINDOW_MS,
};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Total cache budget in bytes
    pub max_cache_size: usize,
    /// Per-resource payload cap in bytes
    pub max_resource_size: usize,
    /// Bookkeeping bytes charged per entry
    pub entry_overhead: usize,
    /// Idle milliseconds before a same-tier entry may be displaced
    pub stale_window_ms: u64,
    /// Access count at which a same-tier entry is protected
    pub cold_access_threshold: u32,
    /// Idle milliseconds before maintenance expires a non-critical entry
    pub expiry_max_age_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background maintenance interval in seconds
    pub maintenance_interval: u64,
    /// Directory served as the resource provider, if any
    pub resource_dir: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_CACHE_SIZE` - Cache budget in bytes (default: 262144)
    /// - `MAX_RESOURCE_SIZE` - Per-resource cap in bytes (default: 65536)
    /// - `ENTRY_OVERHEAD` - Per-entry overhead in bytes (default: 64)
    /// - `STALE_WINDOW_MS` - Same-tier staleness window (default: 300000)
    /// - `COLD_ACCESS_THRESHOLD` - Hot access count (default: 3)
    /// - `EXPIRY_MAX_AGE_MS` - Expiry age for maintenance (default: 3600000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAINTENANCE_INTERVAL` - Maintenance frequency in seconds (default: 60)
    /// - `RESOURCE_DIR` - Directory of `<id>.dat` files for read-through (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_cache_size: env_or("MAX_CACHE_SIZE", defaults.max_cache_size),
            max_resource_size: env_or("MAX_RESOURCE_SIZE", defaults.max_resource_size),
            entry_overhead: env_or("ENTRY_OVERHEAD", defaults.entry_overhead),
            stale_window_ms: env_or("STALE_WINDOW_MS", defaults.stale_window_ms),
            cold_access_threshold: env_or(
                "COLD_ACCESS_THRESHOLD",
                defaults.cold_access_threshold,
            ),
            expiry_max_age_ms: env_or("EXPIRY_MAX_AGE_MS", defaults.expiry_max_age_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            maintenance_interval: env_or("MAINTENANCE_INTERVAL", defaults.maintenance_interval),
            resource_dir: env::var("RESOURCE_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// Settings for the cache core.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            max_cache_size: self.max_cache_size,
            max_resource_size: self.max_resource_size,
            entry_overhead: self.entry_overhead,
            stale_window_ms: self.stale_window_ms,
            cold_access_threshold: self.cold_access_threshold,
            expiry_max_age_ms: self.expiry_max_age_ms,
        }
    }
}

/// Parses `key` from the environment, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_resource_size: DEFAULT_MAX_RESOURCE_SIZE,
            entry_overhead: DEFAULT_ENTRY_OVERHEAD,
            stale_window_ms: DEFAULT_STALE_WINDOW_MS,
            cold_access_threshold: DEFAULT_COLD_ACCESS_THRESHOLD,
            expiry_max_age_ms: DEFAULT_EXPIRY_MAX_AGE_MS,
            server_port: 3000,
            maintenance_interval: 60,
            resource_dir: None,
        }
    }
}
