//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator, DeploymentEnvironment};
use config::{Config, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use warden_core::{WardenError, WardenResult};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "WARDEN";

/// Variable selecting the deployment environment (and its config file).
pub const ENVIRONMENT_VAR: &str = "WARDEN_ENVIRONMENT";

/// Configuration loader.
///
/// Configuration is loaded from multiple sources in order:
/// 1. `<dir>/default.toml` - Default values
/// 2. `<dir>/<environment>.toml` - Environment-specific overrides
/// 3. `<dir>/local.toml` - Local overrides (not committed)
/// 4. Environment variables with `WARDEN_` prefix and `__` separator
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    environment: Option<DeploymentEnvironment>,
    env_vars: Option<config::Map<String, String>>,
}

impl ConfigLoader {
    /// Creates a loader reading files from `config_dir`.
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            environment: None,
            env_vars: None,
        }
    }

    /// Creates a loader for the default location (`./config`).
    #[must_use]
    pub fn from_default_location() -> Self {
        Self::new("./config")
    }

    /// Pins the environment instead of reading `WARDEN_ENVIRONMENT`.
    #[must_use]
    pub const fn with_environment(mut self, environment: DeploymentEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Replaces the process environment with an explicit variable set.
    #[must_use]
    pub fn with_env_vars(mut self, vars: config::Map<String, String>) -> Self {
        self.env_vars = Some(vars);
        self
    }

    /// Loads, deserializes, and validates the configuration.
    pub fn load(&self) -> WardenResult<AppConfig> {
        if self.env_vars.is_none() {
            if let Err(e) = dotenvy::dotenv() {
                debug!("No .env file found or error loading it: {}", e);
            }
        }

        let environment = self.resolve_environment()?;
        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = self.config_dir.join(format!("{}.toml", name));
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("security.admin_emails")
                .source(self.env_vars.clone()),
        );

        let app_config: AppConfig = builder
            .set_override("app.environment", environment.as_str())
            .map_err(config_error_to_warden_error)?
            .build()
            .map_err(config_error_to_warden_error)?
            .try_deserialize()
            .map_err(config_error_to_warden_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn resolve_environment(&self) -> WardenResult<DeploymentEnvironment> {
        if let Some(environment) = self.environment {
            return Ok(environment);
        }

        let raw = match &self.env_vars {
            Some(vars) => vars.get(ENVIRONMENT_VAR).cloned(),
            None => std::env::var(ENVIRONMENT_VAR).ok(),
        };

        raw.map_or_else(|| Ok(DeploymentEnvironment::default()), |raw| raw.parse())
    }

    fn validate_config(config: &AppConfig) -> WardenResult<()> {
        if config.app.environment.is_production() && config.security.uses_default_secrets() {
            warn!("Using default token secrets in production! This is a security risk.");
        }

        ConfigValidator::validate(config).map_err(|errors| {
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            WardenError::Configuration(message)
        })
    }
}

fn config_error_to_warden_error(err: ConfigError) -> WardenError {
    WardenError::Configuration(err.to_string())
}
