//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and evictions.

use serde::Serialize;

use super::Priority;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of lookups for absent resources
    pub misses: u64,
    /// Number of entries reclaimed under memory pressure
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or None if no lookups have been made.
    pub fn hit_rate(&self) -> Option<f64> {
        let total = self.hits + self.misses;
        if total == 0 {
            None
        } else {
            Some(self.hits as f64 / total as f64)
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }

    // == Reset ==
    /// Zeroes the cumulative counters. The entry count is cache state, not a counter.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }
}

// == Snapshot ==
/// Point-in-time view of the cache for monitors and the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub resource_count: usize,
    pub cache_size: usize,
    pub max_cache_size: usize,
    /// cache_size / max_cache_size
    pub utilization: f64,
    pub hits: u64,
    pub misses: u64,
    /// null until the first lookup
    pub hit_rate: Option<f64>,
    pub evictions: u64,
    /// Most recently used entries first
    pub recent: Vec<EntrySummary>,
}

/// Metadata of one cached resource, payload excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub size: usize,
    pub priority: Priority,
    pub age_ms: u64,
    pub idle_ms: u64,
    pub access_count: u32,
}
