//! Typed ID wrappers for identities and token subjects.

use crate::{WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A strongly-typed wrapper for identity IDs.
///
/// Identities are keyed by the relational store's integer primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub i64);

impl IdentityId {
    /// Creates an identity ID from its numeric value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parses an identity ID from a string, tolerating surrounding whitespace.
    pub fn parse(s: &str) -> WardenResult<Self> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| WardenError::validation(format!("'{}' is not a numeric identity id", s)))
    }

    /// Returns the inner value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for IdentityId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<IdentityId> for i64 {
    fn from(id: IdentityId) -> Self {
        id.0
    }
}

/// The subject of a verified token as it was carried on the wire.
///
/// Issued tokens carry a number, but older tokens may carry the id as a
/// string. Both are accepted and normalised to an [`IdentityId`] before any
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectId {
    Numeric(i64),
    Text(String),
}

impl SubjectId {
    /// Normalises the subject to an identity ID.
    ///
    /// A subject that is not numeric can never name an identity, so it is
    /// reported as an invalid token rather than a missing record.
    pub fn to_identity_id(&self) -> WardenResult<IdentityId> {
        match self {
            Self::Numeric(id) => Ok(IdentityId(*id)),
            Self::Text(raw) => IdentityId::parse(raw)
                .map_err(|_| WardenError::TokenInvalid(format!("subject '{}' is not numeric", raw))),
        }
    }
}

impl Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{}", id),
            Self::Text(raw) => write!(f, "{}", raw),
        }
    }
}

impl From<i64> for SubjectId {
    fn from(id: i64) -> Self {
        Self::Numeric(id)
    }
}

impl From<IdentityId> for SubjectId {
    fn from(id: IdentityId) -> Self {
        Self::Numeric(id.0)
    }
}

impl From<&str> for SubjectId {
    fn from(raw: &str) -> Self {
        Self::Text(raw.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(raw: String) -> Self {
        Self::Text(raw)
    }
}
