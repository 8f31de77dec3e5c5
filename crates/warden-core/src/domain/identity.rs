//! Identity entity.

use super::Email;
use crate::{IdentityId, WardenResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire name of the nested membership collection.
///
/// Its presence in a cached record is what marks the record as complete.
pub const ORGANIZATION_RELATIONSHIPS_FIELD: &str = "organizationRelationships";

/// The "current user" record resolved for every authenticated request.
///
/// The password digest is deliberately absent: it lives in a separate
/// credential record and is never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: IdentityId,

    pub email: Email,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub active: bool,

    /// Soft-delete flag. Deleted identities are excluded from lookups.
    #[serde(default)]
    pub deleted: bool,

    /// Organization memberships, loaded by the store's eager fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_relationships: Option<Vec<OrganizationMembership>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Creates a new, inactive identity with no memberships loaded.
    #[must_use]
    pub fn new(id: IdentityId, email: Email, name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            name,
            active: false,
            deleted: false,
            organization_relationships: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attaches the membership collection.
    #[must_use]
    pub fn with_memberships(mut self, memberships: Vec<OrganizationMembership>) -> Self {
        self.organization_relationships = Some(memberships);
        self
    }

    /// Checks if the identity may be granted authenticated access.
    #[must_use]
    pub const fn can_authenticate(&self) -> bool {
        self.active && !self.deleted
    }

    /// Flattens the identity into a plain key/value snapshot.
    pub fn to_record(&self) -> WardenResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(crate::WardenError::internal(format!(
                "identity serialized to non-object: {}",
                other
            ))),
        }
    }

    /// Rebuilds an identity from a key/value snapshot.
    pub fn from_record(record: Map<String, Value>) -> WardenResult<Self> {
        Ok(serde_json::from_value(Value::Object(record))?)
    }
}

/// One organization an identity belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationMembership {
    pub organization_id: i64,
    pub role: String,
}

impl OrganizationMembership {
    #[must_use]
    pub fn new(organization_id: i64, role: impl Into<String>) -> Self {
        Self {
            organization_id,
            role: role.into(),
        }
    }
}

/// Whether a lookup should see soft-deleted rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftDelete {
    /// Only rows with `deleted = false`.
    Exclude,
    /// All rows.
    Include,
}

impl SoftDelete {
    /// Checks whether a row with the given flag is visible.
    #[must_use]
    pub const fn admits(self, deleted: bool) -> bool {
        match self {
            Self::Exclude => !deleted,
            Self::Include => true,
        }
    }
}

/// Partial update applied to an identity by the relational store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPatch {
    pub active: Option<bool>,
    pub deleted: Option<bool>,
    pub password_digest: Option<String>,
}

impl IdentityPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }

    #[must_use]
    pub const fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = Some(deleted);
        self
    }

    #[must_use]
    pub fn password_digest(mut self, digest: impl Into<String>) -> Self {
        self.password_digest = Some(digest.into());
        self
    }

    /// Applies the identity-visible fields of this patch.
    ///
    /// The digest is not part of [`Identity`]; stores persist it separately.
    pub fn apply_to(&self, identity: &mut Identity) {
        if let Some(active) = self.active {
            identity.active = active;
        }
        if let Some(deleted) = self.deleted {
            identity.deleted = deleted;
        }
        identity.updated_at = Utc::now();
    }
}
