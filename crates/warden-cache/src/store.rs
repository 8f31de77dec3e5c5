//! Cache store: the boundary where backend failures become tagged outcomes.

use crate::backend::{BackendFailure, CacheBackend};
use crate::{CacheEntry, CacheKey, CacheOutcome, CacheTable, ScanCriteria};
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use warden_config::{CacheConfig, DeploymentEnvironment};
use warden_core::{Clock, SystemClock, WardenResult};

/// Namespaced key-value cache with per-entry expiration.
///
/// Every operation returns a [`CacheOutcome`]; nothing a backend does can
/// surface as an error here. The only errors are local misuse, which
/// `scan` reports for malformed criteria.
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
    environment: DeploymentEnvironment,
    ttl_secs: i64,
    operation_timeout: Duration,
    reads_enabled: AtomicBool,
    clock: Arc<dyn Clock>,
}

impl CacheStore {
    /// Creates a store over a backend using the system clock.
    pub fn new(backend: Arc<dyn CacheBackend>, config: &CacheConfig, environment: DeploymentEnvironment) -> Self {
        Self::with_clock(backend, config, environment, Arc::new(SystemClock))
    }

    /// Creates a store with an explicit clock.
    pub fn with_clock(
        backend: Arc<dyn CacheBackend>,
        config: &CacheConfig,
        environment: DeploymentEnvironment,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            environment,
            ttl_secs: i64::try_from(config.identity_ttl_secs).unwrap_or(i64::MAX),
            operation_timeout: config.operation_timeout(),
            reads_enabled: AtomicBool::new(config.reads_enabled),
            clock,
        }
    }

    /// Physical name of a logical table in this environment.
    #[must_use]
    pub fn table_name(&self, table: CacheTable) -> String {
        table.physical_name(self.environment)
    }

    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    #[must_use]
    pub fn reads_enabled(&self) -> bool {
        self.reads_enabled.load(Ordering::Relaxed)
    }

    /// Runtime kill switch. While disabled, reads report `NotFound`;
    /// writes and deletes still go through.
    pub fn set_reads_enabled(&self, enabled: bool) {
        let previous = self.reads_enabled.swap(enabled, Ordering::Relaxed);
        if previous != enabled {
            warn!(enabled, "Cache reads toggled");
        }
    }

    /// Stores a record under its table's default key field.
    pub async fn put(&self, table: CacheTable, record: Map<String, Value>) -> CacheOutcome<()> {
        self.put_keyed(table, record, table.default_key_field()).await
    }

    /// Stores a record keyed by `key_field`, expiring `ttl` seconds from now.
    ///
    /// A record without a usable key can never be stored and is reported as
    /// a backend error.
    pub async fn put_keyed(&self, table: CacheTable, record: Map<String, Value>, key_field: &str) -> CacheOutcome<()> {
        let Some(key) = record
            .get(key_field)
            .and_then(|value| CacheKey::from_value(key_field, value))
        else {
            warn!(%table, key_field, "Refusing to cache record without a usable key");
            return CacheOutcome::BackendError(format!("record has no usable '{}' field", key_field));
        };

        let entry = CacheEntry {
            key_field: key_field.to_string(),
            key,
            value: record,
            expires_at: self.clock.now_epoch_secs().saturating_add(self.ttl_secs),
        };
        let name = self.table_name(table);

        match self.call(self.backend.put_item(&name, &entry)).await {
            Ok(()) => {
                debug!(table = %name, key = %entry.key, expires_at = entry.expires_at, "Cache put");
                CacheOutcome::Ok(())
            }
            Err(detail) => {
                warn!(table = %name, key = %entry.key, error = %detail, "Cache put failed");
                CacheOutcome::BackendError(detail)
            }
        }
    }

    /// Fetches a live entry by its table's default key field.
    pub async fn get(&self, table: CacheTable, key: impl Into<CacheKey>) -> CacheOutcome<CacheEntry> {
        self.get_keyed(table, key, table.default_key_field()).await
    }

    /// Fetches a live entry keyed by `key_field`.
    pub async fn get_keyed(&self, table: CacheTable, key: impl Into<CacheKey>, key_field: &str) -> CacheOutcome<CacheEntry> {
        let key = key.into();

        if !self.reads_enabled() {
            debug!(%table, %key, "Cache reads disabled; reporting miss");
            return CacheOutcome::NotFound;
        }

        let name = self.table_name(table);
        match self.call(self.backend.get_item(&name, key_field, &key)).await {
            Ok(Some(entry)) => {
                debug!(table = %name, %key, "Cache hit");
                CacheOutcome::Ok(entry)
            }
            Ok(None) => {
                debug!(table = %name, %key, "Cache miss");
                CacheOutcome::NotFound
            }
            Err(detail) => {
                warn!(table = %name, %key, error = %detail, "Cache get failed");
                CacheOutcome::BackendError(detail)
            }
        }
    }

    /// Removes an entry by its table's default key field. Absence is `Ok`.
    pub async fn delete(&self, table: CacheTable, key: impl Into<CacheKey>) -> CacheOutcome<()> {
        self.delete_keyed(table, key, table.default_key_field()).await
    }

    /// Removes an entry keyed by `key_field`. Absence is `Ok`.
    pub async fn delete_keyed(&self, table: CacheTable, key: impl Into<CacheKey>, key_field: &str) -> CacheOutcome<()> {
        let key = key.into();
        let name = self.table_name(table);

        match self.call(self.backend.delete_item(&name, key_field, &key)).await {
            Ok(()) => {
                debug!(table = %name, %key, "Cache delete");
                CacheOutcome::Ok(())
            }
            Err(detail) => {
                warn!(table = %name, %key, error = %detail, "Cache delete failed");
                CacheOutcome::BackendError(detail)
            }
        }
    }

    /// Enumerates live entries. Diagnostics only.
    pub async fn scan(&self, table: CacheTable, criteria: ScanCriteria) -> WardenResult<CacheOutcome<Vec<CacheEntry>>> {
        criteria.validate()?;

        if !self.reads_enabled() {
            debug!(%table, "Cache reads disabled; skipping scan");
            return Ok(CacheOutcome::NotFound);
        }

        let name = self.table_name(table);
        Ok(match self.call(self.backend.scan_items(&name, &criteria)).await {
            Ok(entries) => {
                debug!(table = %name, count = entries.len(), "Cache scan");
                CacheOutcome::Ok(entries)
            }
            Err(detail) => {
                warn!(table = %name, error = %detail, "Cache scan failed");
                CacheOutcome::BackendError(detail)
            }
        })
    }

    /// Runs a backend call under the per-operation timeout.
    async fn call<T>(&self, op: impl Future<Output = Result<T, BackendFailure>>) -> Result<T, String> {
        match tokio::time::timeout(self.operation_timeout, op).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(failure)) => Err(failure.to_string()),
            Err(_) => Err(format!("timed out after {:?}", self.operation_timeout)),
        }
    }
}
