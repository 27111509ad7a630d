//! Unit tests for the cache coordinator and the in-process store.
//!
//! Covers cache-aside behaviour (hit, miss, TTL expiry), pattern-based
//! invalidation, and the degrade-to-miss contract when the backing
//! store fails.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use faultline_api::cache::{keys, CacheCoordinator, CacheError, CacheStore, MemoryStore};

/// A store that fails every operation, for exercising degradation.
struct BrokenStore;

#[async_trait::async_trait]
impl CacheStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Err(CacheError::Unavailable("down for the test".into()))
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("down for the test".into()))
    }

    async fn delete_pattern(&self, _pattern: &str) -> Result<u64, CacheError> {
        Err(CacheError::Unavailable("down for the test".into()))
    }
}

fn coordinator() -> CacheCoordinator {
    CacheCoordinator::in_memory(Duration::from_secs(60))
}

// ---------------------------------------------------------------------------
// Test: miss invokes the factory, hit does not
// ---------------------------------------------------------------------------

#[tokio::test]
async fn second_read_is_served_from_cache() {
    let cache = coordinator();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = Arc::clone(&calls);
        let value: i64 = cache
            .get_or_set("answer", None, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::convert::Infallible>(42)
            })
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1, "factory ran exactly once");
}

// ---------------------------------------------------------------------------
// Test: expired entries read as misses
// ---------------------------------------------------------------------------

#[tokio::test]
async fn expired_entry_is_recomputed() {
    let cache = coordinator();
    let calls = Arc::new(AtomicUsize::new(0));

    let compute = |calls: Arc<AtomicUsize>| async move {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok::<_, std::convert::Infallible>("fresh".to_string())
    };

    cache
        .get_or_set("short-lived", Some(Duration::from_millis(20)), || {
            compute(Arc::clone(&calls))
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    cache
        .get_or_set("short-lived", Some(Duration::from_millis(20)), || {
            compute(Arc::clone(&calls))
        })
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2, "expiry forced a recompute");
}

// ---------------------------------------------------------------------------
// Test: factory errors propagate untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn factory_error_propagates() {
    let cache = coordinator();

    let result: Result<i64, &str> = cache
        .get_or_set("failing", None, || async { Err("store exploded") })
        .await;

    assert_eq!(result.unwrap_err(), "store exploded");
}

// ---------------------------------------------------------------------------
// Test: pattern deletion removes prefix matches, exact keys, and nothing else
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_pattern_matches_prefix_and_exact() {
    let store = MemoryStore::new();
    let ttl = Duration::from_secs(60);

    store.set("ticket:detail:1", "a".into(), ttl).await.unwrap();
    store.set("ticket:list:recent", "b".into(), ttl).await.unwrap();
    store.set("ticket:list:paused", "c".into(), ttl).await.unwrap();
    store.set("pause:ticket:1", "d".into(), ttl).await.unwrap();

    let removed = store.delete_pattern("ticket:list:*").await.unwrap();
    assert_eq!(removed, 2);

    let removed = store.delete_pattern("ticket:detail:1").await.unwrap();
    assert_eq!(removed, 1);

    // The pause entry was untouched.
    assert!(store.get("pause:ticket:1").await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Test: deleting with zero matches is a silent no-op
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_pattern_with_no_matches_is_noop() {
    let store = MemoryStore::new();

    let removed = store.delete_pattern("ticket:list:*").await.unwrap();
    assert_eq!(removed, 0);
}

// ---------------------------------------------------------------------------
// Test: ticket invalidation sweeps detail and list keys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalidate_ticket_sweeps_affected_views() {
    let store = Arc::new(MemoryStore::new());
    let cache = CacheCoordinator::new(Arc::clone(&store) as Arc<dyn CacheStore>, Duration::from_secs(60));
    let ttl = Duration::from_secs(60);

    store
        .set(&keys::ticket_detail(7), "detail".into(), ttl)
        .await
        .unwrap();
    store
        .set("ticket:list:open", "list".into(), ttl)
        .await
        .unwrap();
    store
        .set(&keys::ticket_detail(8), "other".into(), ttl)
        .await
        .unwrap();

    cache.invalidate_ticket(7).await;

    assert!(store.get(&keys::ticket_detail(7)).await.unwrap().is_none());
    assert!(store.get("ticket:list:open").await.unwrap().is_none());
    // A different ticket's detail view survives.
    assert!(store.get(&keys::ticket_detail(8)).await.unwrap().is_some());
}

// ---------------------------------------------------------------------------
// Test: a broken store degrades to a miss, never an error
// ---------------------------------------------------------------------------

#[tokio::test]
async fn broken_store_degrades_to_miss() {
    let cache = CacheCoordinator::new(Arc::new(BrokenStore), Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = Arc::clone(&calls);
        let value: String = cache
            .get_or_set("unreachable", None, || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::convert::Infallible>("computed anyway".to_string())
            })
            .await
            .unwrap();
        assert_eq!(value, "computed anyway");
    }

    // Every read recomputes, and none of them surfaced a cache error.
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// ---------------------------------------------------------------------------
// Test: invalidation against a broken store is absorbed
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalidation_against_broken_store_is_absorbed() {
    let cache = CacheCoordinator::new(Arc::new(BrokenStore), Duration::from_secs(60));

    // Must not panic or propagate anything.
    cache.invalidate_ticket(1).await;
    cache.invalidate_pauses(1).await;
}
