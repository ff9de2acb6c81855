//! Cache Maintenance Task
//!
//! Background task that periodically expires idle entries and brings an
//! over-budget cache back under its optimization target.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Outcome of one maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaintenanceReport {
    /// Entries removed for exceeding the idle age
    pub expired: usize,
    /// Entries evicted by optimization
    pub evicted: usize,
}

/// Runs one maintenance pass under a single write lock.
pub async fn run_maintenance(cache: &RwLock<CacheStore>, max_age_ms: u64) -> MaintenanceReport {
    let mut cache_guard = cache.write().await;
    let expired = cache_guard.cleanup_expired(max_age_ms);
    let evicted = cache_guard.optimize_cache();
    MaintenanceReport { expired, evicted }
}

/// Spawns a background task that runs [`run_maintenance`] every `interval`.
///
/// The first pass happens one full interval after spawning. The returned
/// handle is aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(CacheStore::new(CacheConfig::default())));
/// let handle = spawn_maintenance_task(cache.clone(), Duration::from_secs(60), 3_600_000);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_maintenance_task(
    cache: Arc<RwLock<CacheStore>>,
    interval: Duration,
    max_age_ms: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Starting cache maintenance task with interval of {:?}",
            interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let report = run_maintenance(&cache, max_age_ms).await;

            if report.expired > 0 || report.evicted > 0 {
                info!(
                    "Maintenance: expired {} entries, evicted {} entries",
                    report.expired, report.evicted
                );
            } else {
                debug!("Maintenance: nothing to do");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, ManualClock, Priority};

    fn shared_store(config: CacheConfig) -> (Arc<RwLock<CacheStore>>, ManualClock) {
        let clock = ManualClock::new(0);
        let store = CacheStore::with_clock(config, Arc::new(clock.clone()));
        (Arc::new(RwLock::new(store)), clock)
    }

    #[tokio::test]
    async fn test_run_maintenance_expires_idle_entries() {
        let (cache, clock) = shared_store(CacheConfig::default());
        {
            let mut cache_guard = cache.write().await;
            cache_guard
                .store("old".to_string(), vec![1; 10], Priority::Normal, None)
                .unwrap();
            cache_guard
                .store("pinned".to_string(), vec![2; 10], Priority::Critical, None)
                .unwrap();
        }
        clock.advance(5_000);

        let report = run_maintenance(&cache, 1_000).await;

        assert_eq!(report, MaintenanceReport { expired: 1, evicted: 0 });
        let cache_guard = cache.read().await;
        assert!(!cache_guard.contains("old"));
        assert!(cache_guard.contains("pinned"));
    }

    #[tokio::test]
    async fn test_run_maintenance_leaves_fitting_cache_alone() {
        let config = CacheConfig {
            max_cache_size: 1000,
            entry_overhead: 0,
            ..CacheConfig::default()
        };
        let (cache, _clock) = shared_store(config);
        {
            let mut cache_guard = cache.write().await;
            for id in ["a", "b", "c", "d"] {
                cache_guard
                    .store(id.to_string(), vec![0; 200], Priority::Low, None)
                    .unwrap();
            }
        }

        // 800 bytes fits the budget, so optimization has nothing to do
        let report = run_maintenance(&cache, u64::MAX).await;
        assert_eq!(report, MaintenanceReport::default());
        assert_eq!(cache.read().await.resource_count(), 4);
    }

    #[tokio::test]
    async fn test_maintenance_task_runs_periodically() {
        let (cache, clock) = shared_store(CacheConfig::default());
        {
            let mut cache_guard = cache.write().await;
            cache_guard
                .store("stale".to_string(), vec![1; 10], Priority::Low, None)
                .unwrap();
        }
        clock.advance(10_000);

        let handle = spawn_maintenance_task(cache.clone(), Duration::from_millis(50), 1_000);
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert!(!cache.read().await.contains("stale"));
        handle.abort();
    }

    #[tokio::test]
    async fn test_maintenance_task_can_be_aborted() {
        let (cache, _clock) = shared_store(CacheConfig::default());

        let handle = spawn_maintenance_task(cache, Duration::from_secs(1), 1_000);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
