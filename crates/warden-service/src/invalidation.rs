//! Cache invalidation around identity mutations.

use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};
use warden_cache::{CacheOutcome, CacheStore, CacheTable};
use warden_core::{Identity, IdentityId, WardenResult};

/// Keeps the identity cache from serving state older than the last write.
///
/// Every cache call here is best-effort: failures are logged and dropped so
/// that only relational-store errors ever reach the caller.
#[derive(Clone)]
pub struct InvalidationPolicy {
    cache: Arc<CacheStore>,
}

impl InvalidationPolicy {
    pub fn new(cache: Arc<CacheStore>) -> Self {
        Self { cache }
    }

    /// Removes the cached identity.
    pub async fn evict(&self, id: IdentityId) {
        match self.cache.delete(CacheTable::Identity, id).await {
            CacheOutcome::BackendError(detail) => {
                warn!(identity_id = %id, error = %detail, "Identity eviction failed");
            }
            _ => debug!(identity_id = %id, "Identity evicted from cache"),
        }
    }

    /// Overwrites the cached identity with a post-mutation snapshot.
    ///
    /// A deleted identity is evicted instead.
    pub async fn refresh(&self, identity: &Identity) {
        if identity.deleted {
            self.evict(identity.id).await;
            return;
        }

        let record = match identity.to_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(identity_id = %identity.id, error = %e, "Could not snapshot identity; evicting");
                self.evict(identity.id).await;
                return;
            }
        };

        if let CacheOutcome::BackendError(detail) = self.cache.put(CacheTable::Identity, record).await {
            warn!(identity_id = %identity.id, error = %detail, "Identity cache refresh failed");
        }
    }

    /// Runs a relational write bracketed by eviction and refresh.
    ///
    /// The entry is evicted before the write so a concurrent reader cannot
    /// re-populate it from a pre-write snapshot after the refresh.
    pub async fn apply<F, Fut>(&self, id: IdentityId, mutation: F) -> WardenResult<Identity>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = WardenResult<Identity>> + Send,
    {
        self.evict(id).await;
        let updated = mutation().await?;
        self.refresh(&updated).await;
        info!(identity_id = %id, "Identity mutated");
        Ok(updated)
    }

    /// Soft deletion: the cached copy must not outlive the flag change.
    pub async fn on_soft_delete(&self, id: IdentityId) {
        info!(identity_id = %id, "Identity soft-deleted; evicting");
        self.evict(id).await;
    }
}

impl std::fmt::Debug for InvalidationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidationPolicy")
            .field("backend", &self.cache.backend_name())
            .finish()
    }
}
