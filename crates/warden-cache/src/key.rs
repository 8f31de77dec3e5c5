//! Lookup keys within a cache table.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use warden_core::IdentityId;

/// Field name that always carries a string key.
pub const SLUG_FIELD: &str = "slug";

/// A record's key within its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheKey {
    Numeric(i64),
    Slug(String),
}

impl CacheKey {
    /// Interprets a raw key string for the given key field.
    ///
    /// Slug fields keep the string as-is. Any other field is numeric when
    /// the string parses as an integer, so `"42"` and `42` address the same
    /// entry.
    #[must_use]
    pub fn from_raw(key_field: &str, raw: &str) -> Self {
        if key_field == SLUG_FIELD {
            return Self::Slug(raw.to_string());
        }
        raw.trim()
            .parse::<i64>()
            .map_or_else(|_| Self::Slug(raw.to_string()), Self::Numeric)
    }

    /// Extracts the key from a record field value.
    ///
    /// Returns `None` for values that cannot address an entry (null, bool,
    /// floats, nested structures, empty strings).
    #[must_use]
    pub fn from_value(key_field: &str, value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Numeric),
            Value::String(s) if !s.is_empty() => Some(Self::from_raw(key_field, s)),
            _ => None,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{}", n),
            Self::Slug(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CacheKey {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<IdentityId> for CacheKey {
    fn from(id: IdentityId) -> Self {
        Self::Numeric(id.into_inner())
    }
}

impl From<&str> for CacheKey {
    fn from(slug: &str) -> Self {
        Self::Slug(slug.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_strings_normalize() {
        assert_eq!(CacheKey::from_raw("id", "42"), CacheKey::Numeric(42));
        assert_eq!(CacheKey::from_raw("id", "abc"), CacheKey::Slug("abc".into()));
    }

    #[test]
    fn test_slug_field_stays_string() {
        assert_eq!(CacheKey::from_raw("slug", "42"), CacheKey::Slug("42".into()));
    }

    #[test]
    fn test_from_value() {
        assert_eq!(CacheKey::from_value("id", &json!(7)), Some(CacheKey::Numeric(7)));
        assert_eq!(CacheKey::from_value("id", &json!("7")), Some(CacheKey::Numeric(7)));
        assert_eq!(
            CacheKey::from_value("slug", &json!("apollo")),
            Some(CacheKey::Slug("apollo".into()))
        );
        assert_eq!(CacheKey::from_value("id", &json!(null)), None);
        assert_eq!(CacheKey::from_value("id", &json!(1.5)), None);
        assert_eq!(CacheKey::from_value("slug", &json!("")), None);
    }
}
