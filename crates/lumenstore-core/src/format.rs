//! On-disk dataset format for LumenStore
//!
//! The backing file is a single JSON document:
//!
//! ```text
//! {"version":"1","seq":3,"pairs":{"k":{"value":"v","bool":true,"expires_on":"2024-01-01T00:00:00Z"}}}
//! ```
//!
//! The never-expires flag is stored under the key `bool` and timestamps are
//! RFC 3339. Both are kept as-is so existing files stay readable.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Current dataset format version
pub const FORMAT_VERSION: &str = "1";

/// A stored value plus its expiry metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: String,
    /// When set, `expires_on` is ignored and the entry never expires
    #[serde(rename = "bool")]
    pub no_expire: bool,
    pub expires_on: DateTime<Utc>,
}

impl Entry {
    /// Build an entry written at `now` with the given time-to-live.
    ///
    /// A zero TTL means the entry never expires. `expires_on` is always
    /// stamped so the field is populated on disk.
    pub fn with_ttl(value: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> StoreResult<Self> {
        let expires_on = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|d| now.checked_add_signed(d))
            .ok_or(StoreError::TtlOutOfRange { ttl })?;

        Ok(Self {
            value: value.into(),
            no_expire: ttl.is_zero(),
            expires_on,
        })
    }

    /// An entry is expired once `now` is strictly past its expiry.
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        !self.no_expire && now > self.expires_on
    }
}

/// The full keyed collection, serialized as one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub version: String,
    /// Write generation, bumped by every mutating operation
    pub seq: u64,
    #[serde(default)]
    pub pairs: BTreeMap<String, Entry>,
}

impl Dataset {
    /// Fresh empty dataset at the current format version.
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            seq: 0,
            pairs: BTreeMap::new(),
        }
    }

    /// Entry stored under `key`, expired or not.
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.pairs.get(key)
    }

    /// Insert or replace; returns the previous entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) -> Option<Entry> {
        self.pairs.insert(key.into(), entry)
    }

    /// Delete `key`; returns the removed entry.
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.pairs.remove(key)
    }

    /// Number of entries, counting expired ones.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// True when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Advance the write generation.
    pub fn bump_seq(&mut self) {
        self.seq = self.seq.saturating_add(1);
    }

    /// Drop every entry expired at `now`; returns how many were removed.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|_, entry| !entry.expired(now));
        before - self.pairs.len()
    }

    /// Serialize the whole dataset to its on-disk bytes.
    pub fn encode(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Serialize {
            message: e.to_string(),
        })
    }

    /// Parse on-disk bytes read from `path`.
    ///
    /// Any parse failure, or an unknown format version, is `CorruptStore`.
    pub fn decode(data: &[u8], path: &Path) -> StoreResult<Self> {
        let dataset: Dataset = serde_json::from_slice(data).map_err(|e| StoreError::CorruptStore {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if dataset.version != FORMAT_VERSION {
            return Err(StoreError::CorruptStore {
                path: path.to_path_buf(),
                reason: format!(
                    "unsupported format version {:?} (expected {:?})",
                    dataset.version, FORMAT_VERSION
                ),
            });
        }

        Ok(dataset)
    }
}

impl Default for Dataset {
    fn default() -> Self { Self::new() }
}
