//! JWT token provider for creating and validating tokens.

use super::{ActivationClaims, SessionClaims};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};
use warden_config::SecurityConfig;
use warden_core::{IdentityId, SubjectId, WardenError, WardenResult};

/// Why a token was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),
}

impl From<TokenError> for WardenError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid(reason) => Self::TokenInvalid(reason),
        }
    }
}

/// Verifies session tokens presented with requests.
pub trait TokenVerifier: Send + Sync {
    fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError>;
}

/// Signing and verification keys for one token family.
#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// JWT token provider service.
///
/// Session and activation tokens are signed with different secrets, so one
/// can never be replayed as the other.
#[derive(Clone)]
pub struct TokenProvider {
    session: KeyPair,
    activation: KeyPair,
    validation: Validation,
    session_ttl_secs: i64,
    activation_ttl_secs: i64,
}

impl TokenProvider {
    /// Creates a new token provider.
    #[must_use]
    pub fn new(config: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            session: KeyPair::from_secret(&config.access_token_secret),
            activation: KeyPair::from_secret(&config.activation_token_secret),
            validation,
            session_ttl_secs: i64::try_from(config.access_token_expiration_secs).unwrap_or(i64::MAX),
            activation_ttl_secs: i64::try_from(config.activation_token_expiration_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issues a session token for an identity.
    pub fn issue_session(&self, id: IdentityId) -> WardenResult<String> {
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            id: SubjectId::from(id),
            iat: now,
            exp: now.saturating_add(self.session_ttl_secs),
        };

        let token = sign(&claims, &self.session.encoding)?;
        debug!("Issued session token for identity {}", id);
        Ok(token)
    }

    /// Issues an activation token binding an identity to a temporary password.
    pub fn issue_activation(&self, id: IdentityId, temporary_password: &str) -> WardenResult<String> {
        let now = Utc::now().timestamp();
        let claims = ActivationClaims {
            id: SubjectId::from(id),
            password: temporary_password.to_string(),
            iat: now,
            exp: now.saturating_add(self.activation_ttl_secs),
        };

        let token = sign(&claims, &self.activation.encoding)?;
        debug!("Issued activation token for identity {}", id);
        Ok(token)
    }

    /// Verifies an activation token.
    pub fn verify_activation(&self, token: &str) -> Result<ActivationClaims, TokenError> {
        verify(token, &self.activation.decoding, &self.validation)
    }
}

impl TokenVerifier for TokenProvider {
    fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        verify(token, &self.session.decoding, &self.validation)
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("session_ttl_secs", &self.session_ttl_secs)
            .field("activation_ttl_secs", &self.activation_ttl_secs)
            .finish_non_exhaustive()
    }
}

fn sign<T: Serialize>(claims: &T, key: &EncodingKey) -> WardenResult<String> {
    encode(&Header::default(), claims, key)
        .map_err(|e| WardenError::Internal(format!("Failed to sign token: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, key: &DecodingKey, validation: &Validation) -> Result<T, TokenError> {
    decode::<T>(token, key, validation)
        .map(|data| data.claims)
        .map_err(|e| {
            warn!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken | ErrorKind::InvalidSignature => {
                    TokenError::Invalid("Invalid token signature".to_string())
                }
                _ => TokenError::Invalid(e.to_string()),
            }
        })
}
