//! Scan criteria for diagnostic enumeration.

use crate::CacheEntry;
use serde_json::Value;
use warden_core::{WardenError, WardenResult};

/// Restricts which entries a scan returns.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanCriteria {
    /// Any entries, at most `n`.
    Limit(usize),
    /// Entries whose record has `field == value`.
    FieldEquals {
        field: String,
        value: Value,
        limit: Option<usize>,
    },
}

impl ScanCriteria {
    #[must_use]
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
            limit: None,
        }
    }

    /// Rejects criteria that can never match anything.
    pub fn validate(&self) -> WardenResult<()> {
        match self {
            Self::Limit(0)
            | Self::FieldEquals {
                limit: Some(0), ..
            } => Err(WardenError::validation("scan limit must be at least 1")),
            Self::FieldEquals { field, .. } if field.trim().is_empty() => {
                Err(WardenError::validation("scan field name must not be empty"))
            }
            _ => Ok(()),
        }
    }

    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        match self {
            Self::Limit(n) => Some(*n),
            Self::FieldEquals { limit, .. } => *limit,
        }
    }

    #[must_use]
    pub fn matches(&self, entry: &CacheEntry) -> bool {
        match self {
            Self::Limit(_) => true,
            Self::FieldEquals { field, value, .. } => entry.value.get(field) == Some(value),
        }
    }

    /// Checks whether enough entries have been collected.
    #[must_use]
    pub fn is_satisfied_by(&self, collected: usize) -> bool {
        self.limit().is_some_and(|limit| collected >= limit)
    }
}
