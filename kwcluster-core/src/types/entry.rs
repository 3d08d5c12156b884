//! Cache entry and snapshot types.
//!
//! The snapshot is the whole durable cache slot: a JSON object mapping each
//! domain to its entry.
//!
//! # Slot Format
//!
//! ```text
//! {
//!   "example.com": {
//!     "signature": "9f2c...",
//!     "clusters": [{ "parentId": 1, "childIds": [2, 3] }],
//!     "cachedAt": 1718000000000
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClusterError, Result};
use crate::types::ClusterGroup;

/// Canonical cache key for a domain typed by a user or taken from a URL:
/// trimmed and lowercased. Returns `None` when nothing is left.
///
/// The cache itself stores keys exactly as given, so callers at the edges
/// apply this before every load and save.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_lowercase();
    (!normalized.is_empty()).then_some(normalized)
}

/// A cached cluster index for one domain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Fingerprint of the keyword set that produced `clusters`
    pub signature: String,
    /// The cached cluster index
    pub clusters: Vec<ClusterGroup>,
    /// Write time in milliseconds since the Unix epoch
    pub cached_at: u64,
}

impl CacheEntry {
    /// Creates an entry stamped at `cached_at`.
    pub fn new(signature: impl Into<String>, clusters: Vec<ClusterGroup>, cached_at: u64) -> Self {
        Self {
            signature: signature.into(),
            clusters,
            cached_at,
        }
    }

    /// Age of the entry at `now_ms`. Entries stamped in the future have age zero.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.cached_at)
    }

    /// Returns true once the entry is older than `max_age_ms`.
    pub fn is_expired(&self, now_ms: u64, max_age_ms: u64) -> bool {
        self.age_ms(now_ms) > max_age_ms
    }

    /// Returns true if the entry was produced from the given signature.
    pub fn matches(&self, signature: &str) -> bool {
        self.signature == signature
    }
}

/// The deserialized cache slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CacheSnapshot {
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored slot.
    ///
    /// Fails only when the text is not JSON or not a JSON object. Entries that
    /// do not have the expected shape are dropped and their siblings kept.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| ClusterError::Deserialization(e.to_string()))?;

        let serde_json::Value::Object(map) = value else {
            return Err(ClusterError::Deserialization(
                "cache slot is not a JSON object".into(),
            ));
        };

        let entries = map
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_value::<CacheEntry>(value) {
                Ok(entry) => Some((key, entry)),
                Err(e) => {
                    debug!(domain = %key, error = %e, "Dropping malformed cluster cache entry");
                    None
                }
            })
            .collect();

        Ok(Self { entries })
    }

    /// Serializes the snapshot for storage.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Looks up the entry for a key.
    pub fn get(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Inserts or replaces the entry for a key.
    pub fn insert(&mut self, key: impl Into<String>, entry: CacheEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Removes the entry for a key.
    pub fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        self.entries.remove(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the snapshot holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry)> {
        self.entries.iter()
    }

    /// Drops entries older than `max_age_ms`. Returns how many were dropped.
    pub fn retain_fresh(&mut self, now_ms: u64, max_age_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| !e.is_expired(now_ms, max_age_ms));
        before - self.entries.len()
    }

    /// Evicts the oldest entries until at most `max_entries` remain.
    ///
    /// Age is `cached_at`; equal timestamps fall back to key order so the
    /// result does not depend on map iteration. Returns the evicted keys,
    /// oldest first.
    pub fn evict_oldest(&mut self, max_entries: usize) -> Vec<String> {
        if self.entries.len() <= max_entries {
            return Vec::new();
        }

        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(k, e)| (e.cached_at, k.clone()))
            .collect();
        by_age.sort();

        let excess = self.entries.len() - max_entries;
        by_age
            .into_iter()
            .take(excess)
            .map(|(_, key)| {
                self.entries.remove(&key);
                key
            })
            .collect()
    }
}

impl FromIterator<(String, CacheEntry)> for CacheSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, CacheEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CacheSnapshot {
    type Item = (String, CacheEntry);
    type IntoIter = std::collections::btree_map::IntoIter<String, CacheEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
