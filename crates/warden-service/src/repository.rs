//! Relational store seam.

use async_trait::async_trait;
use warden_core::{Identity, IdentityId, IdentityPatch, SoftDelete, WardenResult};

/// Access to the relational store holding identities and credentials.
///
/// The store is the only source of truth. Implementations load the
/// organization memberships eagerly in `find_by_id`, which is what makes a
/// record fetched here complete.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// Finds an identity by primary key.
    async fn find_by_id(&self, id: IdentityId, soft_delete: SoftDelete) -> WardenResult<Option<Identity>>;

    /// Finds an identity by normalised email.
    async fn find_by_email(&self, email: &str, soft_delete: SoftDelete) -> WardenResult<Option<Identity>>;

    /// Returns the stored password digest, if the identity has one.
    async fn find_password_digest(&self, id: IdentityId) -> WardenResult<Option<String>>;

    /// Applies a patch and returns the updated identity.
    async fn update(&self, id: IdentityId, patch: IdentityPatch) -> WardenResult<Identity>;
}
