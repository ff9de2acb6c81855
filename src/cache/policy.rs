//! Eviction Policy Module
//!
//! Decides which entries to reclaim. The policy never touches the cache itself:
//! it inspects candidates in cold-to-hot order and returns a plan that the
//! store then executes.

use super::{CacheConfig, CacheEntry, Handle, Priority};

// == Eviction Plan ==
/// Victims chosen by the policy, coldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionPlan {
    pub victims: Vec<Handle>,
    /// Sum of the victims' footprints
    pub freed_bytes: usize,
}

impl EvictionPlan {
    fn add(&mut self, handle: Handle, footprint: usize) {
        self.victims.push(handle);
        self.freed_bytes += footprint;
    }
}

// == Eviction Policy ==
/// Priority-aware LRU replacement rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictionPolicy {
    stale_window_ms: u64,
    cold_access_threshold: u32,
    entry_overhead: usize,
}

impl EvictionPolicy {
    pub fn new(stale_window_ms: u64, cold_access_threshold: u32, entry_overhead: usize) -> Self {
        Self {
            stale_window_ms,
            cold_access_threshold,
            entry_overhead,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.stale_window_ms,
            config.cold_access_threshold,
            config.entry_overhead,
        )
    }

    // == Should Evict ==
    /// Whether `entry` may be displaced to make room for an `incoming` resource.
    ///
    /// - strictly less important entries are always displaceable;
    /// - same-tier entries only when idle past the stale window *and* cold;
    /// - more important entries never.
    pub fn should_evict(&self, entry: &CacheEntry, incoming: Priority, now: u64) -> bool {
        if entry.priority.is_less_important_than(incoming) {
            return true;
        }

        entry.priority == incoming
            && entry.idle_ms(now) > self.stale_window_ms
            && entry.access_count < self.cold_access_threshold
    }

    // == Plan Make Space ==
    /// Picks victims among `candidates` (coldest first) until `needed` bytes are covered.
    ///
    /// Returns `None` when every eligible candidate together frees less than
    /// `needed`; in that case nothing should be evicted.
    pub fn plan_make_space<'a, I>(
        &self,
        candidates: I,
        needed: usize,
        incoming: Priority,
        now: u64,
    ) -> Option<EvictionPlan>
    where
        I: IntoIterator<Item = (Handle, &'a CacheEntry)>,
    {
        let mut plan = EvictionPlan::default();

        for (handle, entry) in candidates {
            if plan.freed_bytes >= needed {
                break;
            }
            if self.should_evict(entry, incoming, now) {
                plan.add(handle, entry.footprint(self.entry_overhead));
            }
        }

        (plan.freed_bytes >= needed).then_some(plan)
    }

    // == Plan Free Memory ==
    /// Picks victims among `candidates` (coldest first) until `target` bytes are covered.
    ///
    /// Critical entries are passed over while the bytes already reclaimed are
    /// not more than half of `target`; past that point they are eligible like
    /// any other entry. The threshold is kept as-is even though a single sweep
    /// only ever reaches a critical entry once.
    ///
    /// The plan may fall short of `target` if candidates run out.
    pub fn plan_free_memory<'a, I>(&self, candidates: I, target: usize) -> EvictionPlan
    where
        I: IntoIterator<Item = (Handle, &'a CacheEntry)>,
    {
        let mut plan = EvictionPlan::default();

        for (handle, entry) in candidates {
            if plan.freed_bytes >= target {
                break;
            }
            let half_reclaimed = plan.freed_bytes.saturating_mul(2) > target;
            if entry.priority == Priority::Critical && !half_reclaimed {
                continue;
            }
            plan.add(handle, entry.footprint(self.entry_overhead));
        }

        plan
    }
}

impl Default for EvictionPolicy {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
