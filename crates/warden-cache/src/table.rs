//! Logical cache tables and their physical names.

use serde::{Deserialize, Serialize};
use std::fmt;
use warden_config::DeploymentEnvironment;

/// How a table's records are keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Numeric,
    Slug,
}

/// The closed set of cache namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheTable {
    Identity,
    Organization,
    Project,
}

impl CacheTable {
    pub const ALL: [Self; 3] = [Self::Identity, Self::Organization, Self::Project];

    #[must_use]
    pub const fn logical_name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Organization => "organization",
            Self::Project => "project",
        }
    }

    /// Field a record is keyed by unless the caller overrides it.
    #[must_use]
    pub const fn default_key_field(&self) -> &'static str {
        match self.key_kind() {
            KeyKind::Numeric => "id",
            KeyKind::Slug => "slug",
        }
    }

    #[must_use]
    pub const fn key_kind(&self) -> KeyKind {
        match self {
            Self::Identity | Self::Organization => KeyKind::Numeric,
            Self::Project => KeyKind::Slug,
        }
    }

    /// Physical table name: `<table>-cache-<environment>`.
    #[must_use]
    pub fn physical_name(&self, environment: DeploymentEnvironment) -> String {
        format!("{}-cache-{}", self.logical_name(), environment)
    }
}

impl fmt::Display for CacheTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.logical_name())
    }
}

impl std::str::FromStr for CacheTable {
    type Err = warden_core::WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|table| table.logical_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| warden_core::WardenError::validation(format!("unknown cache table '{}'", s)))
    }
}
