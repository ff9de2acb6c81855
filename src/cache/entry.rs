//! Cache Entry Module
//!
//! Defines cached resources and their priority tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

// == Priority ==
/// Importance tier of a cached resource.
///
/// Lower numeric value means more important, so the derived ordering reads
/// `Critical < Important < Normal < Low`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical = 1,
    Important = 2,
    #[default]
    Normal = 3,
    Low = 4,
}

impl Priority {
    /// All tiers, most important first.
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::Important,
        Priority::Normal,
        Priority::Low,
    ];

    /// Numeric tier value (1..=4).
    pub fn level(self) -> u8 {
        self as u8
    }

    /// True if `self` is strictly less important than `other`.
    pub fn is_less_important_than(self, other: Priority) -> bool {
        self > other
    }
}

impl TryFrom<u8> for Priority {
    type Error = CacheError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Priority::Critical),
            2 => Ok(Priority::Important),
            3 => Ok(Priority::Normal),
            4 => Ok(Priority::Low),
            other => Err(CacheError::InvalidRequest(format!(
                "Priority must be between 1 and 4, got {}",
                other
            ))),
        }
    }
}

impl FromStr for Priority {
    type Err = CacheError;

    /// Accepts either the tier name (case-insensitive) or its numeric level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Priority::Critical),
            "important" => Ok(Priority::Important),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            other => other
                .parse::<u8>()
                .map_err(|_| CacheError::InvalidRequest(format!("Unknown priority: {}", s)))
                .and_then(Priority::try_from),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Critical => "critical",
            Priority::Important => "important",
            Priority::Normal => "normal",
            Priority::Low => "low",
        };
        f.write_str(name)
    }
}

// == Cache Entry ==
/// A single cached resource with its bookkeeping metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Resource identifier
    pub id: String,
    /// Opaque payload bytes
    pub payload: Vec<u8>,
    /// Importance tier
    pub priority: Priority,
    /// Charged payload size in bytes (excludes per-entry overhead)
    pub size: usize,
    /// Creation timestamp (clock milliseconds)
    pub created_at: u64,
    /// Last store/get timestamp (clock milliseconds)
    pub last_accessed_at: u64,
    /// Number of hits and overwrites since creation
    pub access_count: u32,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a fresh entry stamped at `now`.
    pub fn new(id: String, payload: Vec<u8>, priority: Priority, size: usize, now: u64) -> Self {
        Self {
            id,
            payload,
            priority,
            size,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
        }
    }

    /// Bytes this entry charges against the cache budget.
    pub fn footprint(&self, overhead: usize) -> usize {
        self.size + overhead
    }

    /// Milliseconds since creation.
    pub fn age_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Milliseconds since the last store/get.
    pub fn idle_ms(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_accessed_at)
    }

    /// Records an access at `now`.
    pub fn touch(&mut self, now: u64) {
        self.last_accessed_at = now;
        self.access_count = self.access_count.saturating_add(1);
    }
}
