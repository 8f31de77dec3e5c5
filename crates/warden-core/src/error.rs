//! Unified error types for all layers of Warden.

use crate::IdentityId;
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for all layers of Warden.
///
/// Cache-layer failures never appear here: they are absorbed inside the cache
/// store as tagged outcomes. Everything that does appear is something a
/// caller has to act on.
#[derive(Error, Debug)]
pub enum WardenError {
    // ============ Identity Resolution Errors ============
    /// No non-deleted identity exists for the subject.
    #[error("Identity #{0} not found")]
    IdentityNotFound(IdentityId),

    /// The identity exists but has not been activated.
    #[error("Unauthenticated: Inactive User #{0} cannot make requests.")]
    IdentityInactive(IdentityId),

    // ============ Token Errors ============
    /// No bearer token was presented.
    #[error("Unauthenticated: No session token received.")]
    MissingToken,

    /// Token failed verification for a reason other than expiry.
    #[error("Unauthenticated: Invalid Token ({0})")]
    TokenInvalid(String),

    /// Token signature is valid but the token has expired.
    #[error("Unauthenticated: Your session has expired.")]
    TokenExpired,

    // ============ Account Flow Errors ============
    /// Email/password pair did not match an account.
    #[error("Incorrect Email or Password")]
    InvalidCredentials,

    /// Authentication refused for an account-state reason.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    // ============ Infrastructure Errors ============
    /// Relational store error
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// External service error
    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WardenError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IdentityNotFound(_) => "IDENTITY_NOT_FOUND",
            Self::IdentityInactive(_) => "IDENTITY_INACTIVE",
            Self::MissingToken => "MISSING_TOKEN",
            Self::TokenInvalid(_) => "TOKEN_INVALID",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthenticated(_) => "UNAUTHENTICATED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::BusinessRule(_) => "BUSINESS_RULE_VIOLATION",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns true for errors a caller should present as an authentication
    /// failure rather than a missing resource or a server fault.
    #[must_use]
    pub const fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::IdentityInactive(_)
                | Self::MissingToken
                | Self::TokenInvalid(_)
                | Self::TokenExpired
                | Self::InvalidCredentials
                | Self::Unauthenticated(_)
        )
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: std::fmt::Display>(resource_type: &str, id: T) -> Self {
        Self::NotFound(format!("{} not found: {}", resource_type, id))
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a database error.
    #[must_use]
    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}
