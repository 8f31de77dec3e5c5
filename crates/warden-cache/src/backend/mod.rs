//! Physical cache backends.

mod memory;
mod redis_backend;

pub use memory::MemoryCacheBackend;
pub use redis_backend::RedisCacheBackend;

use crate::{CacheEntry, CacheKey, ScanCriteria};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use warden_config::{CacheBackendKind, CacheConfig};
use warden_core::{SystemClock, WardenResult};

/// Failure raised by a backend. Never escapes the cache store.
#[derive(Debug, Error)]
pub enum BackendFailure {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend command failed: {0}")]
    Command(String),

    #[error("corrupt entry under '{key}': {message}")]
    Corrupt { key: String, message: String },
}

/// Storage operations against physical tables.
///
/// Backends own expiry: an entry past its `expires_at` must not be returned
/// by `get_item` or `scan_items`.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Stores an entry, overwriting any entry with the same key.
    async fn put_item(&self, table: &str, entry: &CacheEntry) -> Result<(), BackendFailure>;

    /// Fetches a live entry.
    async fn get_item(
        &self,
        table: &str,
        key_field: &str,
        key: &CacheKey,
    ) -> Result<Option<CacheEntry>, BackendFailure>;

    /// Removes an entry. Removing a missing entry succeeds.
    async fn delete_item(&self, table: &str, key_field: &str, key: &CacheKey) -> Result<(), BackendFailure>;

    /// Enumerates live entries matching the criteria.
    async fn scan_items(&self, table: &str, criteria: &ScanCriteria) -> Result<Vec<CacheEntry>, BackendFailure>;
}

/// Builds the backend selected by configuration.
///
/// Does not contact the backend; reachability is checked by the
/// connectivity probe.
pub fn connect(config: &CacheConfig) -> WardenResult<Arc<dyn CacheBackend>> {
    match config.backend {
        CacheBackendKind::Redis => Ok(Arc::new(RedisCacheBackend::connect(config)?)),
        CacheBackendKind::Memory => Ok(Arc::new(MemoryCacheBackend::new(Arc::new(SystemClock)))),
    }
}

/// Storage key shared by backends: `<table>:<key_field>:<key>`.
pub(crate) fn item_key(table: &str, key_field: &str, key: &CacheKey) -> String {
    format!("{}:{}:{}", table, key_field, key)
}
