//! Deployment environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use warden_core::WardenError;

/// The environment the process is deployed into.
///
/// Part of every physical cache table name, so environments sharing one
/// cache backend never see each other's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentEnvironment {
    Production,
    Beta,
    #[default]
    Alpha,
}

impl DeploymentEnvironment {
    /// All accepted environments.
    pub const ALL: [Self; 3] = [Self::Production, Self::Beta, Self::Alpha];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
        }
    }

    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentEnvironment {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "beta" => Ok(Self::Beta),
            "alpha" => Ok(Self::Alpha),
            other => Err(WardenError::Configuration(format!(
                "environment must be one of production, beta, alpha (got '{}')",
                other
            ))),
        }
    }
}
