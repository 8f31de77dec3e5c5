//! Configuration validation module.
//!
//! Collects every problem in one pass so a misconfigured deployment fails at
//! startup with the full list.

use crate::{AppConfig, CacheBackendKind};
use std::fmt;
use url::Url;
use warden_core::telemetry::ObservabilityConfig;
use warden_core::Email;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// Token secret is too short (minimum 32 characters).
    SecretTooShort {
        name: &'static str,
        actual: usize,
        minimum: usize,
    },
    /// Session and activation tokens share a secret.
    SecretsIdentical,
    /// Pool size is zero or above the maximum allowed.
    InvalidPoolSize { value: usize, maximum: usize },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Duration value must be positive.
    NonPositiveDuration { name: String },
    /// Password hash cost is invalid.
    InvalidHashCost { value: u32, minimum: u32, maximum: u32 },
    /// Log filter has an unknown level.
    InvalidLogLevel { value: String },
    /// Admin allow-list entry is not an email address.
    InvalidAdminEmail { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretTooShort {
                name,
                actual,
                minimum,
            } => {
                write!(
                    f,
                    "{} too short: {} characters (minimum {})",
                    name, actual, minimum
                )
            }
            Self::SecretsIdentical => {
                write!(f, "access and activation token secrets must differ")
            }
            Self::InvalidPoolSize { value, maximum } => {
                write!(f, "Invalid pool size {} (must be 1-{})", value, maximum)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveDuration { name } => {
                write!(f, "'{}' must be positive", name)
            }
            Self::InvalidHashCost {
                value,
                minimum,
                maximum,
            } => {
                write!(
                    f,
                    "Invalid password hash cost: {} (must be between {} and {})",
                    value, minimum, maximum
                )
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
            Self::InvalidAdminEmail { value } => {
                write!(f, "Invalid admin email: '{}'", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Minimum token secret length.
    const MIN_SECRET_LENGTH: usize = 32;
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: usize = 1000;
    /// Minimum Argon2 iteration count.
    const MIN_HASH_COST: u32 = 1;
    /// Maximum Argon2 iteration count.
    const MAX_HASH_COST: u32 = 16;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] =
        &["trace", "debug", "info", "warn", "error", "off"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_security(&config.security, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_security(config: &crate::SecurityConfig, errors: &mut Vec<ConfigValidationError>) {
        for (name, secret) in [
            ("access_token_secret", &config.access_token_secret),
            ("activation_token_secret", &config.activation_token_secret),
        ] {
            if secret.len() < Self::MIN_SECRET_LENGTH {
                errors.push(ConfigValidationError::SecretTooShort {
                    name,
                    actual: secret.len(),
                    minimum: Self::MIN_SECRET_LENGTH,
                });
            }
        }

        if config.access_token_secret == config.activation_token_secret {
            errors.push(ConfigValidationError::SecretsIdentical);
        }

        if config.password_hash_cost < Self::MIN_HASH_COST
            || config.password_hash_cost > Self::MAX_HASH_COST
        {
            errors.push(ConfigValidationError::InvalidHashCost {
                value: config.password_hash_cost,
                minimum: Self::MIN_HASH_COST,
                maximum: Self::MAX_HASH_COST,
            });
        }

        if config.access_token_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "security.access_token_expiration_secs".to_string(),
            });
        }
        if config.activation_token_expiration_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "security.activation_token_expiration_secs".to_string(),
            });
        }

        if let Err(e) = Url::parse(&config.app_url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "app_url".to_string(),
                message: e.to_string(),
            });
        }

        for email in &config.admin_emails {
            if Email::parse(email).is_err() {
                errors.push(ConfigValidationError::InvalidAdminEmail {
                    value: email.clone(),
                });
            }
        }
    }

    fn validate_cache(config: &crate::CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.identity_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "cache.identity_ttl_secs".to_string(),
            });
        }
        if config.operation_timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveDuration {
                name: "cache.operation_timeout_ms".to_string(),
            });
        }

        if config.backend != CacheBackendKind::Redis {
            return;
        }

        if !config.redis_url.starts_with("redis://") && !config.redis_url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        }

        if config.pool_size == 0 || config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::InvalidPoolSize {
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    /// Accepts a bare level or an `EnvFilter`-style directive list such as
    /// `info,warden=debug`.
    fn validate_observability(config: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
        let all_known = config.log_level.split(',').all(|directive| {
            let level = directive.rsplit('=').next().unwrap_or("").trim().to_lowercase();
            Self::VALID_LOG_LEVELS.contains(&level.as_str())
        });

        if !all_known {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}
