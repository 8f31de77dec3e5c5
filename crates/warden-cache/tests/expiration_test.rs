//! Expiration boundary behaviour of the cache store.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use warden_cache::{CacheOutcome, CacheStore, CacheTable, MemoryCacheBackend, ScanCriteria};
use warden_config::{CacheConfig, DeploymentEnvironment};
use warden_core::ManualClock;

const TTL: i64 = 3600;

fn store_at(t0: i64) -> (CacheStore, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0));
    let backend = Arc::new(MemoryCacheBackend::new(clock.clone()));
    let store = CacheStore::with_clock(
        backend,
        &CacheConfig::default(),
        DeploymentEnvironment::Production,
        clock.clone(),
    );
    (store, clock)
}

fn identity_record(id: i64) -> Map<String, Value> {
    json!({ "id": id, "email": format!("user{}@example.com", id), "active": true })
        .as_object()
        .cloned()
        .unwrap_or_default()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime")
}

#[tokio::test]
async fn test_entry_visible_until_the_last_second() {
    let t0 = 1_700_000_000;
    let (store, clock) = store_at(t0);
    store.put(CacheTable::Identity, identity_record(1)).await;

    clock.set(t0 + TTL - 1);
    assert!(store.get(CacheTable::Identity, 1).await.is_ok());

    clock.set(t0 + TTL);
    assert_eq!(store.get(CacheTable::Identity, 1).await, CacheOutcome::NotFound);
}

#[tokio::test]
async fn test_overwrite_extends_expiry() {
    let t0 = 1_700_000_000;
    let (store, clock) = store_at(t0);
    store.put(CacheTable::Identity, identity_record(1)).await;

    clock.set(t0 + 1800);
    store.put(CacheTable::Identity, identity_record(1)).await;

    clock.set(t0 + TTL);
    match store.get(CacheTable::Identity, 1).await {
        CacheOutcome::Ok(entry) => assert_eq!(entry.expires_at, t0 + 1800 + TTL),
        other => panic!("expected hit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_scan_skips_expired_entries() {
    let t0 = 1_700_000_000;
    let (store, clock) = store_at(t0);
    store.put(CacheTable::Identity, identity_record(1)).await;

    clock.set(t0 + 100);
    store.put(CacheTable::Identity, identity_record(2)).await;

    clock.set(t0 + TTL);
    let entries = store
        .scan(CacheTable::Identity, ScanCriteria::Limit(10))
        .await
        .unwrap()
        .into_option()
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].value["id"], 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// An entry written at t0 is returned at every t < t0 + 3600 and is
    /// absent at every t >= t0 + 3600.
    #[test]
    fn prop_expiration_boundary(
        t0 in 0i64..4_000_000_000,
        id in 1i64..1_000_000,
        offset in 0i64..(2 * TTL),
    ) {
        let (store, clock) = store_at(t0);
        let rt = runtime();

        let outcome = rt.block_on(async {
            store.put(CacheTable::Identity, identity_record(id)).await;
            clock.set(t0 + offset);
            store.get(CacheTable::Identity, id).await
        });

        if offset < TTL {
            prop_assert!(outcome.is_ok(), "expected hit at offset {}", offset);
        } else {
            prop_assert_eq!(outcome, CacheOutcome::NotFound);
        }
    }

    /// Writing the same record any number of times leaves exactly one entry.
    #[test]
    fn prop_repeated_put_is_idempotent(id in 1i64..1_000_000, times in 1usize..8) {
        let (store, _clock) = store_at(1_700_000_000);
        let rt = runtime();

        let entries = rt.block_on(async {
            for _ in 0..times {
                store.put(CacheTable::Identity, identity_record(id)).await;
            }
            store.scan(CacheTable::Identity, ScanCriteria::Limit(100)).await
        });

        let entries = entries.expect("valid criteria").into_option().expect("memory backend");
        prop_assert_eq!(entries.len(), 1);
        prop_assert_eq!(entries[0].value.clone(), identity_record(id));
    }
}
