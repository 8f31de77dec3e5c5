//! In-process cache backend.

use super::{item_key, BackendFailure, CacheBackend};
use crate::{CacheEntry, CacheKey, ScanCriteria};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::trace;
use warden_core::Clock;

/// Map-backed cache for single-process deployments and tests.
///
/// Expired entries are hidden on read and purged on the next write to the
/// same table.
pub struct MemoryCacheBackend {
    tables: RwLock<BTreeMap<String, BTreeMap<String, CacheEntry>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryCacheBackend {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Number of stored entries in a table, expired ones included.
    #[must_use]
    pub fn stored_len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl CacheBackend for MemoryCacheBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn put_item(&self, table: &str, entry: &CacheEntry) -> Result<(), BackendFailure> {
        let now = self.clock.now_epoch_secs();
        let mut tables = self.tables.write();
        let rows = tables.entry(table.to_string()).or_default();
        rows.retain(|_, existing| !existing.is_expired_at(now));
        rows.insert(item_key(table, &entry.key_field, &entry.key), entry.clone());
        trace!(table, key = %entry.key, "memory put");
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key_field: &str,
        key: &CacheKey,
    ) -> Result<Option<CacheEntry>, BackendFailure> {
        let now = self.clock.now_epoch_secs();
        let tables = self.tables.read();
        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(&item_key(table, key_field, key)))
            .filter(|entry| !entry.is_expired_at(now))
            .cloned())
    }

    async fn delete_item(&self, table: &str, key_field: &str, key: &CacheKey) -> Result<(), BackendFailure> {
        if let Some(rows) = self.tables.write().get_mut(table) {
            rows.remove(&item_key(table, key_field, key));
        }
        Ok(())
    }

    async fn scan_items(&self, table: &str, criteria: &ScanCriteria) -> Result<Vec<CacheEntry>, BackendFailure> {
        let now = self.clock.now_epoch_secs();
        let tables = self.tables.read();
        let mut found = Vec::new();

        for entry in tables.get(table).into_iter().flat_map(BTreeMap::values) {
            if criteria.is_satisfied_by(found.len()) {
                break;
            }
            if !entry.is_expired_at(now) && criteria.matches(entry) {
                found.push(entry.clone());
            }
        }

        Ok(found)
    }
}
