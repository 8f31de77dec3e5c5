//! Redis cache backend.

use super::{item_key, BackendFailure, CacheBackend};
use crate::{CacheEntry, CacheKey, ScanCriteria};
use async_trait::async_trait;
use deadpool_redis::{Config, Pool, PoolError, Runtime};
use redis::AsyncCommands;
use tracing::{debug, info, warn};
use warden_config::CacheConfig;
use warden_core::{WardenError, WardenResult};

/// Keys fetched per SCAN round trip.
const SCAN_BATCH: usize = 100;

/// Cache backend storing each entry as a JSON string with an absolute
/// `EXAT` expiry, so Redis itself drops expired entries.
pub struct RedisCacheBackend {
    pool: Pool,
}

impl RedisCacheBackend {
    /// Builds a connection pool without contacting the server.
    pub fn connect(config: &CacheConfig) -> WardenResult<Self> {
        info!("Creating Redis connection pool for identity cache...");

        let pool = Config::from_url(&config.redis_url)
            .builder()
            .map_err(|e| WardenError::Configuration(format!("Invalid Redis config: {}", e)))?
            .max_size(config.pool_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(config.operation_timeout()))
            .create_timeout(Some(config.operation_timeout()))
            .build()
            .map_err(|e| WardenError::Configuration(format!("Failed to create pool: {}", e)))?;

        Ok(Self::from_pool(pool))
    }

    #[must_use]
    pub const fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, BackendFailure> {
        Ok(self.pool.get().await?)
    }

    fn decode(key: &str, raw: &str) -> Result<CacheEntry, BackendFailure> {
        serde_json::from_str(raw).map_err(|e| BackendFailure::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

impl From<redis::RedisError> for BackendFailure {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
            Self::Unavailable(err.to_string())
        } else {
            Self::Command(err.to_string())
        }
    }
}

impl From<PoolError> for BackendFailure {
    fn from(err: PoolError) -> Self {
        Self::Unavailable(format!("Failed to get Redis connection: {}", err))
    }
}

#[async_trait]
impl CacheBackend for RedisCacheBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn put_item(&self, table: &str, entry: &CacheEntry) -> Result<(), BackendFailure> {
        let key = item_key(table, &entry.key_field, &entry.key);
        let payload = serde_json::to_string(entry).map_err(|e| BackendFailure::Corrupt {
            key: key.clone(),
            message: e.to_string(),
        })?;

        let mut conn = self.conn().await?;
        redis::cmd("SET")
            .arg(&key)
            .arg(payload)
            .arg("EXAT")
            .arg(entry.expires_at)
            .query_async::<()>(&mut conn)
            .await?;

        debug!("Cached key '{}' until {}", key, entry.expires_at);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key_field: &str,
        key: &CacheKey,
    ) -> Result<Option<CacheEntry>, BackendFailure> {
        let key = item_key(table, key_field, key);
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(&key).await?;

        raw.map(|raw| Self::decode(&key, &raw)).transpose()
    }

    async fn delete_item(&self, table: &str, key_field: &str, key: &CacheKey) -> Result<(), BackendFailure> {
        let key = item_key(table, key_field, key);
        let mut conn = self.conn().await?;
        let deleted: i64 = conn.del(&key).await?;

        debug!("Deleted key '{}': {}", key, deleted > 0);
        Ok(())
    }

    async fn scan_items(&self, table: &str, criteria: &ScanCriteria) -> Result<Vec<CacheEntry>, BackendFailure> {
        let pattern = format!("{}:*", table);
        let mut conn = self.conn().await?;
        let mut cursor: u64 = 0;
        let mut found = Vec::new();

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                // Keys can expire between SCAN and MGET.
                let values: Vec<Option<String>> = redis::cmd("MGET").arg(&keys).query_async(&mut conn).await?;

                for (key, raw) in keys.iter().zip(values) {
                    let Some(raw) = raw else { continue };
                    match Self::decode(key, &raw) {
                        Ok(entry) if criteria.matches(&entry) => found.push(entry),
                        Ok(_) => {}
                        Err(e) => warn!("Skipping unreadable cache entry: {}", e),
                    }
                    if criteria.is_satisfied_by(found.len()) {
                        return Ok(found);
                    }
                }
            }

            cursor = next;
            if cursor == 0 {
                return Ok(found);
            }
        }
    }
}
