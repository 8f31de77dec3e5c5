//! Bearer session authentication.

use crate::resolver::{IdentityResolver, ResolvedIdentity};
use std::sync::Arc;
use tracing::debug;
use warden_core::{WardenError, WardenResult};
use warden_security::TokenVerifier;

const BEARER_PREFIX: &str = "Bearer ";

/// Turns an `Authorization` header into a resolved identity.
pub struct SessionAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
    resolver: Arc<IdentityResolver>,
}

impl SessionAuthenticator {
    pub fn new(verifier: Arc<dyn TokenVerifier>, resolver: Arc<IdentityResolver>) -> Self {
        Self { verifier, resolver }
    }

    pub async fn authenticate(&self, authorization: Option<&str>) -> WardenResult<ResolvedIdentity> {
        let token = bearer_token(authorization).ok_or(WardenError::MissingToken)?;
        let claims = self.verifier.verify_session(token)?;
        debug!(subject = %claims.id, "Session token verified");
        self.resolver.resolve(claims.id).await
    }
}

/// Extracts the token from a `Bearer <token>` header value.
fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.trim().strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
