//! Cached record snapshot.

use crate::CacheKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One cached record.
///
/// `value` is a flat copy of a relational row at write time. It holds no
/// references, so an entry can always be dropped and rebuilt from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key_field: String,
    pub key: CacheKey,
    pub value: Map<String, Value>,
    /// Absolute epoch second after which the entry is gone.
    pub expires_at: i64,
}

impl CacheEntry {
    /// An entry is absent once `now >= expires_at`.
    #[must_use]
    pub const fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// Returns the snapshot, dropping the cache metadata.
    #[must_use]
    pub fn into_record(self) -> Map<String, Value> {
        self.value
    }
}
