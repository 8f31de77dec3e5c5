//! Cache-aside resolution of the authenticated identity.

use crate::repository::IdentityRepository;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warden_cache::{CacheOutcome, CacheStore, CacheTable};
use warden_core::{
    Email, Identity, IdentityId, SoftDelete, SubjectId, WardenError, WardenResult,
    ORGANIZATION_RELATIONSHIPS_FIELD,
};

/// Where a resolved identity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    Cache,
    Store,
}

/// The identity attached to a request, plus request-scoped attributes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedIdentity {
    #[serde(flatten)]
    pub identity: Identity,

    /// Computed per request from the allow-list; never cached.
    pub is_admin: bool,

    #[serde(skip)]
    pub origin: ResolutionOrigin,
}

/// Case-insensitive set of administrator emails.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            emails: emails
                .into_iter()
                .map(|email| Email::normalize(email.as_ref()))
                .filter(|email| !email.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, email: &Email) -> bool {
        self.emails.contains(&Email::normalize(email.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.emails.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// Resolves a token subject to the current identity.
///
/// One pass, cache then store. The cache is consulted first and only a
/// complete, non-deleted record is trusted; anything else falls through to
/// the relational store, whose result is written back best-effort. Cache
/// failures are indistinguishable from misses; store failures propagate.
pub struct IdentityResolver {
    cache: Arc<CacheStore>,
    repository: Arc<dyn IdentityRepository>,
    admins: AdminAllowList,
}

impl IdentityResolver {
    pub fn new(cache: Arc<CacheStore>, repository: Arc<dyn IdentityRepository>, admins: AdminAllowList) -> Self {
        Self {
            cache,
            repository,
            admins,
        }
    }

    /// Resolves a subject (numeric id or numeric-looking string).
    pub async fn resolve(&self, subject: impl Into<SubjectId>) -> WardenResult<ResolvedIdentity> {
        let id = subject.into().to_identity_id()?;

        let (identity, origin) = match self.from_cache(id).await {
            Some(identity) => (identity, ResolutionOrigin::Cache),
            None => (self.from_store(id).await?, ResolutionOrigin::Store),
        };

        if !identity.can_authenticate() {
            info!(identity_id = %id, "Refusing inactive identity");
            return Err(WardenError::IdentityInactive(id));
        }

        let is_admin = self.admins.contains(&identity.email);
        Ok(ResolvedIdentity {
            identity,
            is_admin,
            origin,
        })
    }

    async fn from_cache(&self, id: IdentityId) -> Option<Identity> {
        let entry = match self.cache.get(CacheTable::Identity, id).await {
            CacheOutcome::Ok(entry) => entry,
            CacheOutcome::NotFound | CacheOutcome::BackendError(_) => return None,
        };

        let record = entry.into_record();
        if !is_complete(&record) {
            debug!(identity_id = %id, "Cached identity is incomplete; refetching");
            return None;
        }

        match Identity::from_record(record) {
            Ok(identity) if identity.deleted => {
                debug!(identity_id = %id, "Cached identity is soft-deleted; refetching");
                None
            }
            Ok(identity) => Some(identity),
            Err(e) => {
                warn!(identity_id = %id, error = %e, "Cached identity failed to decode; refetching");
                None
            }
        }
    }

    async fn from_store(&self, id: IdentityId) -> WardenResult<Identity> {
        let found = self
            .repository
            .find_by_id(id, SoftDelete::Exclude)
            .await
            .map_err(|e| {
                error!(identity_id = %id, error = %e, "Identity lookup failed");
                e
            })?;

        let identity = match found {
            Some(identity) if !identity.deleted => identity,
            _ => return Err(WardenError::IdentityNotFound(id)),
        };

        self.populate(&identity).await;
        Ok(identity)
    }

    async fn populate(&self, identity: &Identity) {
        let record = match identity.to_record() {
            Ok(record) => record,
            Err(e) => {
                warn!(identity_id = %identity.id, error = %e, "Could not snapshot identity for cache");
                return;
            }
        };

        if let CacheOutcome::BackendError(detail) = self.cache.put(CacheTable::Identity, record).await {
            warn!(identity_id = %identity.id, error = %detail, "Identity cache population failed");
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("backend", &self.cache.backend_name())
            .field("admins", &self.admins.len())
            .finish_non_exhaustive()
    }
}

/// A cached record is complete when its membership collection is present.
fn is_complete(record: &Map<String, Value>) -> bool {
    record
        .get(ORGANIZATION_RELATIONSHIPS_FIELD)
        .is_some_and(|value| !value.is_null())
}
