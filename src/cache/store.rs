//! Cache Store Module
//!
//! Main cache engine combining id lookup, recency ordering, a byte budget and
//! priority-aware eviction.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cache::{
    CacheConfig, CacheEntry, CacheSnapshot, CacheStats, Clock, EntrySummary, EvictionPolicy,
    Handle, Priority, RecencyIndex, SystemClock, OPTIMIZE_TARGET_PERCENT, SNAPSHOT_RECENT_LIMIT,
};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Bounded resource cache with a byte budget and priority-aware LRU eviction.
///
/// Every entry is charged `size + entry_overhead` bytes against `max_bytes`.
/// The store is the only owner of entry payloads; readers receive copies.
#[derive(Debug)]
pub struct CacheStore {
    /// Id to arena handle
    ids: HashMap<String, Handle>,
    /// Entries in recency order, head = most recently used
    order: RecencyIndex<CacheEntry>,
    /// Replacement rules
    policy: EvictionPolicy,
    /// Performance statistics
    stats: CacheStats,
    /// Time source for entry timestamps
    clock: Arc<dyn Clock>,
    /// Sum of entry footprints
    total_bytes: usize,
    max_bytes: usize,
    max_resource_bytes: usize,
    entry_overhead: usize,
    expiry_max_age_ms: u64,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store driven by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock::new()))
    }

    /// Creates an empty store driven by `clock`.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            ids: HashMap::new(),
            order: RecencyIndex::new(),
            policy: EvictionPolicy::from_config(&config),
            stats: CacheStats::new(),
            clock,
            total_bytes: 0,
            max_bytes: config.max_cache_size,
            max_resource_bytes: config.max_resource_size,
            entry_overhead: config.entry_overhead,
            expiry_max_age_ms: config.expiry_max_age_ms,
        }
    }

    // == Lifecycle ==
    /// Starts the store from an empty state.
    pub fn begin(&mut self) {
        self.clear();
        info!(
            "Resource cache initialized: max_cache_size={} bytes, max_resource_size={} bytes",
            self.max_bytes, self.max_resource_bytes
        );
    }

    /// Releases every entry and reports the final statistics.
    pub fn shutdown(&mut self) {
        self.log_stats();
        self.clear();
        info!("Resource cache shut down");
    }

    // == Store ==
    /// Stores `payload` under `id` with the given priority.
    ///
    /// The charged size is `size_hint` when it is positive, otherwise the
    /// payload length. Without a hint the per-resource cap applies to the
    /// payload length plus the entry overhead. Storing a new id may evict
    /// colder entries first; when the budget cannot be met the call fails and
    /// nothing changes. Overwriting an existing id can fail the same way when
    /// the new size grows past what eviction can reclaim.
    ///
    /// # Errors
    /// - `InvalidRequest` if the resource would be charged zero bytes
    /// - `OversizedResource` if the size exceeds the per-resource cap
    /// - `InsufficientCapacity` if eligible evictions cannot make room, for a
    ///   new entry or for a growing overwrite
    pub fn store(
        &mut self,
        id: String,
        payload: Vec<u8>,
        priority: Priority,
        size_hint: Option<usize>,
    ) -> Result<()> {
        let (size, capped_size) = match size_hint {
            Some(hint) if hint > 0 => (hint, hint),
            _ => (payload.len(), payload.len() + self.entry_overhead),
        };

        if size == 0 {
            warn!("Rejected empty resource {}", id);
            return Err(CacheError::InvalidRequest(format!(
                "Resource {} is empty and has no size hint",
                id
            )));
        }

        if capped_size > self.max_resource_bytes {
            warn!(
                "Resource {} too large ({} bytes), max allowed: {}",
                id, capped_size, self.max_resource_bytes
            );
            return Err(CacheError::OversizedResource {
                id,
                size: capped_size,
                max: self.max_resource_bytes,
            });
        }

        if let Some(&handle) = self.ids.get(&id) {
            return self.overwrite(handle, id, payload, priority, size);
        }

        let required = size + self.entry_overhead;
        if !self.make_space_for(required, priority) {
            warn!("Cannot make space for resource {} ({} bytes)", id, size);
            return Err(CacheError::InsufficientCapacity { id, required });
        }

        let entry = CacheEntry::new(id.clone(), payload, priority, size, self.now());
        let handle = self.order.push_front(entry);
        debug!(
            "Cached new resource: {} ({} bytes, priority: {})",
            id, size, priority
        );
        self.ids.insert(id, handle);
        self.total_bytes += required;
        self.stats.set_total_entries(self.ids.len());

        Ok(())
    }

    /// Replaces an existing entry in place.
    ///
    /// Growth beyond the budget is reclaimed from other entries; the entry
    /// being replaced is never its own victim.
    fn overwrite(
        &mut self,
        handle: Handle,
        id: String,
        payload: Vec<u8>,
        priority: Priority,
        size: usize,
    ) -> Result<()> {
        let old_footprint = match self.order.get(handle) {
            Some(entry) => entry.footprint(self.entry_overhead),
            None => {
                return Err(CacheError::Internal(format!(
                    "recency index out of sync for {}",
                    id
                )))
            }
        };
        let new_footprint = size + self.entry_overhead;
        let now = self.now();

        let others = self.total_bytes - old_footprint;
        if others + new_footprint > self.max_bytes {
            let needed = others + new_footprint - self.max_bytes;
            let candidates = self
                .order
                .iter_from_back()
                .filter(|(candidate, _)| *candidate != handle);
            match self.policy.plan_make_space(candidates, needed, priority, now) {
                Some(plan) => {
                    self.evict_all(&plan.victims);
                }
                None => {
                    warn!("Cannot make space to grow resource {} to {} bytes", id, size);
                    return Err(CacheError::InsufficientCapacity {
                        id,
                        required: new_footprint,
                    });
                }
            }
        }

        if let Some(entry) = self.order.get_mut(handle) {
            entry.payload = payload;
            entry.size = size;
            entry.priority = priority;
            entry.touch(now);
        }
        self.total_bytes = self.total_bytes - old_footprint + new_footprint;
        self.order.move_to_front(handle);
        debug!("Updated cached resource: {} ({} bytes)", id, size);

        Ok(())
    }

    // == Get ==
    /// Returns a copy of the payload stored under `id`.
    ///
    /// A hit promotes the entry to most recently used. A miss is the normal
    /// signal for the caller to fetch the resource elsewhere.
    pub fn get(&mut self, id: &str) -> Option<Vec<u8>> {
        self.get_entry(id).map(|entry| entry.payload.clone())
    }

    /// Like [`get`](Self::get), but borrows the whole entry so callers can
    /// read its payload and metadata in one step.
    pub fn get_entry(&mut self, id: &str) -> Option<&CacheEntry> {
        let now = self.now();
        let Some(&handle) = self.ids.get(id) else {
            self.stats.record_miss();
            return None;
        };

        self.order.move_to_front(handle);
        match self.order.get_mut(handle) {
            Some(entry) => {
                entry.touch(now);
                self.stats.record_hit();
                Some(&*entry)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Whether `id` is cached. No recency or stats effect.
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    /// Entry metadata without touching it.
    pub fn peek(&self, id: &str) -> Option<&CacheEntry> {
        self.ids.get(id).and_then(|&handle| self.order.get(handle))
    }

    // == Remove ==
    /// Deletes an entry. Returns whether it existed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ids.get(id).copied() {
            Some(handle) => {
                self.detach(handle);
                debug!("Removed cached resource: {}", id);
                true
            }
            None => false,
        }
    }

    // == Clear ==
    /// Drops every entry. Cumulative counters are kept.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.order.clear();
        self.total_bytes = 0;
        self.stats.set_total_entries(0);
        info!("Cache cleared");
    }

    // == Free Memory ==
    /// Evicts cold entries until `target_bytes` are reclaimed or candidates run out.
    ///
    /// Critical entries are spared until more than half of the target has
    /// been reclaimed. Returns the number of evicted entries.
    pub fn free_memory(&mut self, target_bytes: usize) -> usize {
        info!("Attempting to free {} bytes from cache", target_bytes);

        let plan = self
            .policy
            .plan_free_memory(self.order.iter_from_back(), target_bytes);
        let evicted = self.evict_all(&plan.victims);

        info!("Freed {} resources ({} bytes)", evicted, plan.freed_bytes);
        evicted
    }

    // == Optimize ==
    /// Brings an over-budget cache back under `OPTIMIZE_TARGET_PERCENT` of its budget.
    ///
    /// Returns the number of evicted entries.
    pub fn optimize_cache(&mut self) -> usize {
        if self.total_bytes <= self.max_bytes {
            debug!("Cache optimization not needed");
            return 0;
        }

        let target_size = self.max_bytes.saturating_mul(OPTIMIZE_TARGET_PERCENT) / 100;
        self.free_memory(self.total_bytes - target_size)
    }

    /// Changes the total budget, shrinking the cache if it no longer fits.
    pub fn set_max_cache_size(&mut self, max_bytes: usize) {
        self.max_bytes = max_bytes;
        if self.total_bytes > self.max_bytes {
            self.optimize_cache();
        }
    }

    // == Make Space ==
    /// Ensures `required` more bytes fit in the budget for a resource of `incoming` priority.
    ///
    /// Victims are only evicted when together they cover the shortfall;
    /// otherwise nothing is evicted and false is returned.
    pub fn make_space_for(&mut self, required: usize, incoming: Priority) -> bool {
        if self.total_bytes + required <= self.max_bytes {
            return true;
        }

        let needed = self.total_bytes + required - self.max_bytes;
        let now = self.now();
        match self
            .policy
            .plan_make_space(self.order.iter_from_back(), needed, incoming, now)
        {
            Some(plan) => {
                self.evict_all(&plan.victims);
                true
            }
            None => {
                debug!(
                    "No eviction plan covers {} bytes for a {} resource",
                    needed, incoming
                );
                false
            }
        }
    }

    // == Cleanup Expired ==
    /// Removes non-critical entries idle for longer than `max_age_ms`.
    ///
    /// Expiry is not counted as eviction. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self, max_age_ms: u64) -> usize {
        let now = self.now();
        let expired: Vec<Handle> = self
            .order
            .iter_from_back()
            .filter(|(_, entry)| {
                entry.priority != Priority::Critical && entry.idle_ms(now) > max_age_ms
            })
            .map(|(handle, _)| handle)
            .collect();

        let count = expired
            .into_iter()
            .filter(|&handle| self.detach(handle).is_some())
            .count();

        if count > 0 {
            info!("Cleaned up {} expired resources", count);
        }
        count
    }

    /// [`cleanup_expired`](Self::cleanup_expired) with the configured max age.
    pub fn cleanup_expired_default(&mut self) -> usize {
        self.cleanup_expired(self.expiry_max_age_ms)
    }

    // == Priority Queries ==
    /// Ids of the given tier, most recently used first.
    pub fn resources_by_priority(&self, priority: Priority) -> Vec<String> {
        self.order
            .iter()
            .filter(|(_, entry)| entry.priority == priority)
            .map(|(_, entry)| entry.id.clone())
            .collect()
    }

    /// All ids, most recently used first.
    pub fn resources(&self) -> Vec<String> {
        self.order.iter().map(|(_, entry)| entry.id.clone()).collect()
    }

    /// Changes the tier of an entry in place.
    ///
    /// Recency, size and budget are untouched and nothing is re-evaluated: a
    /// promoted entry keeps the space it won under its old tier until the next
    /// sweep. Returns whether the entry existed.
    pub fn update_priority(&mut self, id: &str, priority: Priority) -> bool {
        let Some(&handle) = self.ids.get(id) else {
            return false;
        };
        match self.order.get_mut(handle) {
            Some(entry) => {
                entry.priority = priority;
                debug!("Updated priority for {} to {}", id, priority);
                true
            }
            None => false,
        }
    }

    // == Introspection ==
    pub fn resource_count(&self) -> usize {
        self.ids.len()
    }

    /// Bytes currently charged against the budget.
    pub fn cache_size(&self) -> usize {
        self.total_bytes
    }

    pub fn max_cache_size(&self) -> usize {
        self.max_bytes
    }

    pub fn max_resource_size(&self) -> usize {
        self.max_resource_bytes
    }

    /// cache_size / max_cache_size
    pub fn cache_utilization(&self) -> f64 {
        if self.max_bytes == 0 {
            return 0.0;
        }
        self.total_bytes as f64 / self.max_bytes as f64
    }

    /// hits / (hits + misses), or None before the first lookup.
    pub fn hit_rate(&self) -> Option<f64> {
        self.stats.hit_rate()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.ids.len());
        stats
    }

    /// Zeroes hit, miss and eviction counters.
    pub fn reset_stats(&mut self) {
        self.stats.reset();
        info!("Cache statistics reset");
    }

    /// Structured view of the cache and its most recently used entries.
    pub fn snapshot(&self) -> CacheSnapshot {
        let now = self.now();
        let recent = self
            .order
            .iter()
            .take(SNAPSHOT_RECENT_LIMIT)
            .map(|(_, entry)| EntrySummary {
                id: entry.id.clone(),
                size: entry.size,
                priority: entry.priority,
                age_ms: entry.age_ms(now),
                idle_ms: entry.idle_ms(now),
                access_count: entry.access_count,
            })
            .collect();

        CacheSnapshot {
            resource_count: self.ids.len(),
            cache_size: self.total_bytes,
            max_cache_size: self.max_bytes,
            utilization: self.cache_utilization(),
            hits: self.stats.hits,
            misses: self.stats.misses,
            hit_rate: self.stats.hit_rate(),
            evictions: self.stats.evictions,
            recent,
        }
    }

    /// Emits the snapshot through tracing.
    pub fn log_stats(&self) {
        let snapshot = self.snapshot();
        info!(
            resources = snapshot.resource_count,
            cache_size = snapshot.cache_size,
            max_cache_size = snapshot.max_cache_size,
            utilization = snapshot.utilization,
            hits = snapshot.hits,
            misses = snapshot.misses,
            hit_rate = ?snapshot.hit_rate,
            evictions = snapshot.evictions,
            "Cache statistics"
        );
        for (rank, entry) in snapshot.recent.iter().enumerate() {
            info!(
                "{}. {} ({} bytes, P{}, age: {}ms, last: {}ms, hits: {})",
                rank + 1,
                entry.id,
                entry.size,
                entry.priority.level(),
                entry.age_ms,
                entry.idle_ms,
                entry.access_count
            );
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    // --- Internal helpers ---

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Unlinks an entry and releases its footprint.
    fn detach(&mut self, handle: Handle) -> Option<CacheEntry> {
        let entry = self.order.remove(handle)?;
        self.ids.remove(&entry.id);
        self.total_bytes -= entry.footprint(self.entry_overhead);
        self.stats.set_total_entries(self.ids.len());
        Some(entry)
    }

    /// Evicts every victim, counting each one. Returns how many were evicted.
    fn evict_all(&mut self, victims: &[Handle]) -> usize {
        let mut evicted = 0;
        for &handle in victims {
            if let Some(entry) = self.detach(handle) {
                self.stats.record_eviction();
                evicted += 1;
                debug!(
                    "Evicting resource: {} ({} bytes, priority: {})",
                    entry.id, entry.size, entry.priority
                );
            }
        }
        evicted
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        use std::collections::HashSet;

        let ordered: HashSet<&str> = self.order.iter().map(|(_, e)| e.id.as_str()).collect();
        let keyed: HashSet<&str> = self.ids.keys().map(String::as_str).collect();
        assert_eq!(ordered, keyed, "id map and recency order diverged");
        assert_eq!(self.order.len(), self.ids.len());

        for (id, &handle) in &self.ids {
            let entry = self.order.get(handle).expect("handle must be live");
            assert_eq!(&entry.id, id);
            assert!(entry.size <= self.max_resource_bytes);
        }

        let charged: usize = self
            .order
            .iter()
            .map(|(_, e)| e.footprint(self.entry_overhead))
            .sum();
        assert_eq!(self.total_bytes, charged, "byte accounting drifted");
        assert_eq!(self.stats().total_entries, self.ids.len());
    }
}
