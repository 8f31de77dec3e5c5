//! JWT claims structures.

use serde::{Deserialize, Serialize};
use warden_core::SubjectId;

/// Claims carried by a session (access) token.
///
/// `id` is accepted as a number or a numeric string; normalisation to an
/// identity id happens at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity the session belongs to.
    pub id: SubjectId,

    /// Issued at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}

/// Claims carried by an activation token sent by email.
///
/// The temporary password proves the token was issued for the identity's
/// current credential: once the password changes, the token no longer
/// matches any identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationClaims {
    /// Identity to activate.
    pub id: SubjectId,

    /// Temporary password set when the token was issued.
    pub password: String,

    /// Issued at timestamp.
    pub iat: i64,

    /// Expiration timestamp.
    pub exp: i64,
}
