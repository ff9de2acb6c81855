//! Cache Module
//!
//! Byte-budgeted resource cache with priority-aware LRU eviction.

mod clock;
mod config;
mod entry;
mod policy;
mod recency;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use entry::{CacheEntry, Priority};
pub use policy::{EvictionPlan, EvictionPolicy};
pub use recency::{Handle, RecencyIndex};
pub use stats::{CacheSnapshot, CacheStats, EntrySummary};
pub use store::CacheStore;

// == Public Constants ==
/// Default total byte budget
pub const DEFAULT_MAX_CACHE_SIZE: usize = 256 * 1024; // 256 KB

/// Default per-resource payload cap
pub const DEFAULT_MAX_RESOURCE_SIZE: usize = 64 * 1024; // 64 KB

/// Default bookkeeping bytes charged per entry
pub const DEFAULT_ENTRY_OVERHEAD: usize = 64;

/// Default idle time before a same-tier entry can be displaced
pub const DEFAULT_STALE_WINDOW_MS: u64 = 300_000; // 5 minutes

/// Default access count at which a same-tier entry counts as hot
pub const DEFAULT_COLD_ACCESS_THRESHOLD: u32 = 3;

/// Default idle time before cleanup expires a non-critical entry
pub const DEFAULT_EXPIRY_MAX_AGE_MS: u64 = 3_600_000; // 1 hour

/// Share of the budget an over-full cache is reduced to by optimization
pub const OPTIMIZE_TARGET_PERCENT: usize = 80;

/// Number of entries listed in a snapshot
pub const SNAPSHOT_RECENT_LIMIT: usize = 10;
