//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's structural invariants and laws over
//! arbitrary operation sequences.

use proptest::prelude::*;
use std::sync::Arc;

use crate::cache::{CacheConfig, CacheStore, ManualClock, Priority};
use crate::error::CacheError;

// == Test Configuration ==
const TEST_MAX_CACHE_SIZE: usize = 1024;
const TEST_MAX_RESOURCE_SIZE: usize = 512;
const TEST_ENTRY_OVERHEAD: usize = 64;

fn test_config() -> CacheConfig {
    CacheConfig {
        max_cache_size: TEST_MAX_CACHE_SIZE,
        max_resource_size: TEST_MAX_RESOURCE_SIZE,
        entry_overhead: TEST_ENTRY_OVERHEAD,
        ..CacheConfig::default()
    }
}

fn test_store() -> (CacheStore, ManualClock) {
    let clock = ManualClock::new(0);
    (
        CacheStore::with_clock(test_config(), Arc::new(clock.clone())),
        clock,
    )
}

// == Strategies ==
/// Small id space so operations collide on the same entries
fn id_strategy() -> impl Strategy<Value = String> {
    "[a-f]".prop_map(|s| s)
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop::sample::select(Priority::ALL.to_vec())
}

/// Largest payload accepted without a size hint
const TEST_MAX_PAYLOAD: usize = TEST_MAX_RESOURCE_SIZE - TEST_ENTRY_OVERHEAD;

/// Mostly valid sizes, with an occasional oversized payload
fn size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![
        9 => 1usize..=TEST_MAX_PAYLOAD,
        1 => (TEST_MAX_PAYLOAD + 1)..2048usize,
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    Store {
        id: String,
        size: usize,
        priority: Priority,
    },
    Get {
        id: String,
    },
    Remove {
        id: String,
    },
    Advance {
        ms: u64,
    },
    FreeMemory {
        target: usize,
    },
    Cleanup {
        max_age: u64,
    },
    UpdatePriority {
        id: String,
        priority: Priority,
    },
    Optimize,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (id_strategy(), size_strategy(), priority_strategy())
            .prop_map(|(id, size, priority)| CacheOp::Store { id, size, priority }),
        4 => id_strategy().prop_map(|id| CacheOp::Get { id }),
        1 => id_strategy().prop_map(|id| CacheOp::Remove { id }),
        2 => (0u64..400_000).prop_map(|ms| CacheOp::Advance { ms }),
        1 => (0usize..1500).prop_map(|target| CacheOp::FreeMemory { target }),
        1 => (0u64..600_000).prop_map(|max_age| CacheOp::Cleanup { max_age }),
        1 => (id_strategy(), priority_strategy())
            .prop_map(|(id, priority)| CacheOp::UpdatePriority { id, priority }),
        1 => Just(CacheOp::Optimize),
    ]
}

fn apply(store: &mut CacheStore, clock: &ManualClock, op: CacheOp) {
    match op {
        CacheOp::Store { id, size, priority } => {
            let _ = store.store(id, vec![b'v'; size], priority, None);
        }
        CacheOp::Get { id } => {
            store.get(&id);
        }
        CacheOp::Remove { id } => {
            store.remove(&id);
        }
        CacheOp::Advance { ms } => clock.advance(ms),
        CacheOp::FreeMemory { target } => {
            store.free_memory(target);
        }
        CacheOp::Cleanup { max_age } => {
            store.cleanup_expired(max_age);
        }
        CacheOp::UpdatePriority { id, priority } => {
            store.update_priority(&id, priority);
        }
        CacheOp::Optimize => {
            store.optimize_cache();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Index/map bijection, byte accounting and the budget hold after every operation
    #[test]
    fn prop_invariants_hold(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (mut store, clock) = test_store();

        for op in ops {
            apply(&mut store, &clock, op);
            store.assert_invariants();
            prop_assert!(
                store.cache_size() <= store.max_cache_size(),
                "cache size {} exceeds budget {}",
                store.cache_size(),
                store.max_cache_size()
            );
        }
    }

    // A rejected store leaves entries, bytes and counters exactly as they were
    #[test]
    fn prop_failed_store_is_side_effect_free(
        ops in prop::collection::vec(cache_op_strategy(), 0..40),
        id in id_strategy(),
        size in size_strategy(),
        priority in priority_strategy()
    ) {
        let (mut store, clock) = test_store();
        for op in ops {
            apply(&mut store, &clock, op);
        }

        let resources_before = store.resources();
        let size_before = store.cache_size();
        let stats_before = store.stats();

        let result = store.store(id, vec![b'n'; size], priority, None);

        if result.is_err() {
            let is_capacity_error = matches!(
                result,
                Err(CacheError::OversizedResource { .. })
                    | Err(CacheError::InsufficientCapacity { .. })
            );
            prop_assert!(is_capacity_error, "unexpected store error: {:?}", result);
            prop_assert_eq!(store.resources(), resources_before);
            prop_assert_eq!(store.cache_size(), size_before);
            prop_assert_eq!(store.stats(), stats_before);
        }
    }

    // A successful store is immediately readable with the same payload
    #[test]
    fn prop_roundtrip_storage(
        ops in prop::collection::vec(cache_op_strategy(), 0..40),
        id in id_strategy(),
        payload in prop::collection::vec(any::<u8>(), 1..=TEST_MAX_PAYLOAD),
        priority in priority_strategy()
    ) {
        let (mut store, clock) = test_store();
        for op in ops {
            apply(&mut store, &clock, op);
        }

        if store.store(id.clone(), payload.clone(), priority, None).is_ok() {
            prop_assert_eq!(store.get(&id), Some(payload));
        }
    }

    // get(id) makes id the head and the previous head the runner-up
    #[test]
    fn prop_recency_law(
        ops in prop::collection::vec(cache_op_strategy(), 1..40),
        id in id_strategy()
    ) {
        let (mut store, clock) = test_store();
        for op in ops {
            apply(&mut store, &clock, op);
        }
        prop_assume!(store.contains(&id));

        let previous_head = store.resources()[0].clone();
        store.get(&id);

        let order = store.resources();
        prop_assert_eq!(&order[0], &id);
        if previous_head != id {
            prop_assert_eq!(&order[1], &previous_head);
        }
    }

    // Removing twice reports false the second time
    #[test]
    fn prop_idempotent_removal(
        ops in prop::collection::vec(cache_op_strategy(), 0..40),
        id in id_strategy()
    ) {
        let (mut store, clock) = test_store();
        for op in ops {
            apply(&mut store, &clock, op);
        }

        let existed = store.contains(&id);
        prop_assert_eq!(store.remove(&id), existed);
        prop_assert!(!store.remove(&id));
        store.assert_invariants();
    }

    // After h hits and m misses, hit rate is h / (h + m)
    #[test]
    fn prop_hit_rate_law(
        ops in prop::collection::vec(cache_op_strategy(), 1..60)
    ) {
        let (mut store, clock) = test_store();
        let mut hits = 0u64;
        let mut misses = 0u64;

        for op in ops {
            if let CacheOp::Get { id } = &op {
                if store.contains(id) {
                    hits += 1;
                } else {
                    misses += 1;
                }
            }
            apply(&mut store, &clock, op);
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        match store.hit_rate() {
            None => prop_assert_eq!(hits + misses, 0),
            Some(rate) => {
                let expected = hits as f64 / (hits + misses) as f64;
                prop_assert!((rate - expected).abs() < 1e-12);
            }
        }
    }

    // Critical entries never expire by age alone
    #[test]
    fn prop_cleanup_never_expires_critical(
        ops in prop::collection::vec(cache_op_strategy(), 1..60),
        max_age in 0u64..1_000
    ) {
        let (mut store, clock) = test_store();
        for op in ops {
            apply(&mut store, &clock, op);
        }
        let critical_before = store.resources_by_priority(Priority::Critical);
        let evictions_before = store.stats().evictions;

        clock.advance(10_000);
        store.cleanup_expired(max_age);

        prop_assert_eq!(store.resources_by_priority(Priority::Critical), critical_before);
        prop_assert_eq!(store.stats().evictions, evictions_before);
        prop_assert_eq!(store.len(), store.resources_by_priority(Priority::Critical).len());
    }
}

// == Property Test for Error Response Format ==
// This tests the CacheError -> HTTP response conversion

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error renders as JSON with a string "error" field carrying the message
    #[test]
    fn prop_error_response_format(
        error_msg in "[a-zA-Z0-9 _-]{1,100}",
        size in 0usize..1_000_000
    ) {
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            CacheError::OversizedResource { id: error_msg.clone(), size, max: 65_536 },
            CacheError::InsufficientCapacity { id: error_msg.clone(), required: size },
            CacheError::NotFound(error_msg.clone()),
            CacheError::InvalidRequest(error_msg.clone()),
            CacheError::Provider(error_msg.clone()),
            CacheError::Internal(error_msg.clone()),
        ];

        for error in error_variants {
            let expected_msg = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok());
            prop_assert!(
                content_type.map(|ct| ct.contains("application/json")).unwrap_or(false),
                "Response should have JSON content-type"
            );

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX))
                .expect("body should be readable");
            let json: serde_json::Value =
                serde_json::from_slice(&bytes).expect("Response body should be valid JSON");

            prop_assert_eq!(json["error"].as_str(), Some(expected_msg.as_str()));
        }
    }
}

// == Property Test for Concurrent Operation Correctness ==
// Shared access through Arc<RwLock<CacheStore>>, as the server does

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // Concurrent tasks each hold the lock for a whole operation, so the
    // invariants hold once they all finish
    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        use tokio::sync::RwLock;

        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let (store, clock) = test_store();
            let store = Arc::new(RwLock::new(store));

            let mut handles = vec![];
            for op in operations {
                let store = Arc::clone(&store);
                let clock = clock.clone();
                handles.push(tokio::spawn(async move {
                    let mut cache = store.write().await;
                    apply(&mut cache, &clock, op);
                    cache.cache_size() <= cache.max_cache_size()
                }));
            }

            for handle in handles {
                let within_budget = handle.await.expect("Task should not panic");
                prop_assert!(within_budget, "budget exceeded inside a critical section");
            }

            let cache = store.read().await;
            cache.assert_invariants();
            Ok(())
        })?;
    }
}
