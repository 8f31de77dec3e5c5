//! Application configuration structures.

use crate::DeploymentEnvironment;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use warden_core::telemetry::ObservabilityConfig;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and environment.
    #[serde(default)]
    pub app: AppMetadata,

    /// Identity cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Token and password configuration.
    #[serde(default)]
    pub security: SecurityConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Deployment environment.
    pub environment: DeploymentEnvironment,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "warden".to_string(),
            environment: DeploymentEnvironment::default(),
        }
    }
}

/// Which cache backend to connect to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    #[default]
    Redis,
    /// In-process map. Not shared between processes.
    Memory,
}

/// Identity cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Backend kind.
    pub backend: CacheBackendKind,
    /// Redis URL (used when `backend = "redis"`).
    pub redis_url: String,
    /// Connection pool size.
    pub pool_size: usize,
    /// Kill switch: when false every cache read reports a miss.
    pub reads_enabled: bool,
    /// Lifetime of a cached identity in seconds.
    pub identity_ttl_secs: u64,
    /// Upper bound on a single backend call in milliseconds.
    pub operation_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackendKind::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            reads_enabled: true,
            identity_ttl_secs: 3600, // 1 hour
            operation_timeout_ms: 500,
        }
    }
}

impl CacheConfig {
    /// Returns the per-operation timeout as a Duration.
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

/// Token and password configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// HMAC secret for session tokens.
    pub access_token_secret: String,
    /// HMAC secret for activation tokens. Must differ from the session secret.
    pub activation_token_secret: String,
    /// Session token lifetime in seconds.
    pub access_token_expiration_secs: u64,
    /// Activation token lifetime in seconds.
    pub activation_token_expiration_secs: u64,
    /// Password hashing cost (Argon2 iterations).
    pub password_hash_cost: u32,
    /// Emails granted the admin flag at resolution time.
    pub admin_emails: Vec<String>,
    /// Public base URL used to build activation links.
    pub app_url: String,
}

pub(crate) const DEFAULT_ACCESS_SECRET: &str = "change-me-in-production-access-token-secret";
pub(crate) const DEFAULT_ACTIVATION_SECRET: &str = "change-me-in-production-activation-token-secret";

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            access_token_secret: DEFAULT_ACCESS_SECRET.to_string(),
            activation_token_secret: DEFAULT_ACTIVATION_SECRET.to_string(),
            access_token_expiration_secs: 86400,     // 1 day
            activation_token_expiration_secs: 86400, // 1 day
            password_hash_cost: 3,
            admin_emails: Vec::new(),
            app_url: "http://localhost:3000".to_string(),
        }
    }
}

impl SecurityConfig {
    /// Checks whether either secret is still the shipped default.
    #[must_use]
    pub fn uses_default_secrets(&self) -> bool {
        self.access_token_secret == DEFAULT_ACCESS_SECRET
            || self.activation_token_secret == DEFAULT_ACTIVATION_SECRET
    }
}
