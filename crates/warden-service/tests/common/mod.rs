//! Shared doubles and fixtures for the service tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use warden_cache::{
    BackendFailure, CacheBackend, CacheEntry, CacheKey, CacheOutcome, CacheStore, CacheTable, MemoryCacheBackend,
    ScanCriteria,
};
use warden_config::{CacheConfig, DeploymentEnvironment};
use warden_core::{
    Email, Identity, IdentityId, IdentityPatch, ManualClock, OrganizationMembership, SoftDelete, WardenError,
    WardenResult,
};
use warden_service::{AdminAllowList, IdentityRepository, IdentityResolver, InvalidationPolicy};

pub const T0: i64 = 1_700_000_000;
pub const TTL: i64 = 3600;

struct StoredIdentity {
    identity: Identity,
    digest: Option<String>,
}

/// Relational store double backed by a map.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    rows: Mutex<HashMap<IdentityId, StoredIdentity>>,
    find_by_id_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identity: Identity, digest: Option<&str>) {
        self.rows.lock().insert(
            identity.id,
            StoredIdentity {
                identity,
                digest: digest.map(str::to_string),
            },
        );
    }

    pub fn get(&self, id: IdentityId) -> Option<Identity> {
        self.rows.lock().get(&id).map(|row| row.identity.clone())
    }

    pub fn digest(&self, id: IdentityId) -> Option<String> {
        self.rows.lock().get(&id).and_then(|row| row.digest.clone())
    }

    /// Edits a row behind the cache's back.
    pub fn modify(&self, id: IdentityId, edit: impl FnOnce(&mut Identity)) {
        if let Some(row) = self.rows.lock().get_mut(&id) {
            edit(&mut row.identity);
        }
    }

    pub fn find_by_id_calls(&self) -> usize {
        self.find_by_id_calls.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn find_by_id(&self, id: IdentityId, soft_delete: SoftDelete) -> WardenResult<Option<Identity>> {
        self.find_by_id_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(WardenError::database("connection reset"));
        }
        Ok(self
            .rows
            .lock()
            .get(&id)
            .filter(|row| soft_delete.admits(row.identity.deleted))
            .map(|row| row.identity.clone()))
    }

    async fn find_by_email(&self, email: &str, soft_delete: SoftDelete) -> WardenResult<Option<Identity>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(WardenError::database("connection reset"));
        }
        Ok(self
            .rows
            .lock()
            .values()
            .filter(|row| soft_delete.admits(row.identity.deleted))
            .find(|row| row.identity.email.matches(email))
            .map(|row| row.identity.clone()))
    }

    async fn find_password_digest(&self, id: IdentityId) -> WardenResult<Option<String>> {
        Ok(self.digest(id))
    }

    async fn update(&self, id: IdentityId, patch: IdentityPatch) -> WardenResult<Identity> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(WardenError::database("write rejected"));
        }
        let mut rows = self.rows.lock();
        let row = rows.get_mut(&id).ok_or_else(|| WardenError::not_found("Identity", id))?;
        patch.apply_to(&mut row.identity);
        if let Some(digest) = patch.password_digest {
            row.digest = Some(digest);
        }
        Ok(row.identity.clone())
    }
}

/// Backend whose every call fails as if the server were down.
#[derive(Debug, Default)]
pub struct FailingCacheBackend {
    pub calls: AtomicUsize,
}

impl FailingCacheBackend {
    fn fail(&self) -> BackendFailure {
        self.calls.fetch_add(1, Ordering::SeqCst);
        BackendFailure::Unavailable("connection refused".to_string())
    }
}

#[async_trait]
impl CacheBackend for FailingCacheBackend {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn put_item(&self, _table: &str, _entry: &CacheEntry) -> Result<(), BackendFailure> {
        Err(self.fail())
    }

    async fn get_item(&self, _table: &str, _key_field: &str, _key: &CacheKey) -> Result<Option<CacheEntry>, BackendFailure> {
        Err(self.fail())
    }

    async fn delete_item(&self, _table: &str, _key_field: &str, _key: &CacheKey) -> Result<(), BackendFailure> {
        Err(self.fail())
    }

    async fn scan_items(&self, _table: &str, _criteria: &ScanCriteria) -> Result<Vec<CacheEntry>, BackendFailure> {
        Err(self.fail())
    }
}

pub fn membership() -> Vec<OrganizationMembership> {
    vec![OrganizationMembership::new(10, "owner")]
}

/// A complete identity as the store's eager fetch returns it.
pub fn identity(id: i64, active: bool) -> Identity {
    let mut identity = Identity::new(
        IdentityId::new(id),
        Email::new_unchecked(format!("user{}@example.com", id)),
        Some(format!("User {}", id)),
    )
    .with_memberships(membership());
    identity.active = active;
    identity
}

/// Snapshot of an identity without its membership collection.
pub fn partial_record(identity: &Identity) -> Map<String, Value> {
    let mut record = identity.to_record().expect("record");
    record.remove(warden_core::ORGANIZATION_RELATIONSHIPS_FIELD);
    record
}

/// Cache, store, resolver, and invalidation wired over in-memory doubles.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub cache: Arc<CacheStore>,
    pub repository: Arc<InMemoryIdentityRepository>,
    pub resolver: IdentityResolver,
    pub invalidation: InvalidationPolicy,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(None, &[])
    }

    pub fn with_admins(admins: &[&str]) -> Self {
        Self::build(None, admins)
    }

    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self::build(Some(backend), &[])
    }

    fn build(backend: Option<Arc<dyn CacheBackend>>, admins: &[&str]) -> Self {
        let clock = Arc::new(ManualClock::new(T0));
        let backend = backend.unwrap_or_else(|| Arc::new(MemoryCacheBackend::new(clock.clone())));
        let cache = Arc::new(CacheStore::with_clock(
            backend,
            &CacheConfig::default(),
            DeploymentEnvironment::Alpha,
            clock.clone(),
        ));
        let repository = Arc::new(InMemoryIdentityRepository::new());
        let resolver = IdentityResolver::new(
            Arc::clone(&cache),
            repository.clone(),
            AdminAllowList::new(admins.iter().copied()),
        );
        let invalidation = InvalidationPolicy::new(Arc::clone(&cache));

        Self {
            clock,
            cache,
            repository,
            resolver,
            invalidation,
        }
    }

    /// Direct lookup in the cache, bypassing the resolver.
    pub async fn cached(&self, id: i64) -> Option<CacheEntry> {
        self.cache.get(CacheTable::Identity, id).await.into_option()
    }

    pub async fn seed_cache(&self, record: Map<String, Value>) {
        assert_eq!(self.cache.put(CacheTable::Identity, record).await, CacheOutcome::Ok(()));
    }
}
