//! In-memory slot store.
//!
//! Stands in for browser local storage in tests and single-process runs,
//! including its habit of rejecting writes once a quota is reached.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use kwcluster_core::error::{ClusterError, Result};
use kwcluster_core::traits::Store;

/// In-memory slot store.
///
/// # Quota
///
/// With a quota set, a write is rejected when the total size of all keys and
/// values after the write would exceed it. The previous value is kept.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Creates an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that rejects writes beyond `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Writes a slot bypassing the quota. Used to plant arbitrary contents.
    pub fn raw_insert(&self, key: &str, value: &str) {
        self.slots.write().insert(key.to_string(), value.to_string());
    }

    /// Total bytes used by keys and values.
    pub fn used_bytes(&self) -> usize {
        Self::size_of(&self.slots.read())
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.read().len()
    }

    /// Returns true if no slot is set.
    pub fn is_empty(&self) -> bool {
        self.slots.read().is_empty()
    }

    /// Removes every slot.
    pub fn clear(&self) {
        self.slots.write().clear();
    }

    fn size_of(slots: &HashMap<String, String>) -> usize {
        slots.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.write();

        if let Some(limit) = self.quota_bytes {
            let current = slots.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let requested = Self::size_of(&slots) - current + key.len() + value.len();
            if requested > limit {
                debug!(key, limit, requested, "Memory store quota exceeded");
                return Err(ClusterError::QuotaExceeded { limit, requested });
            }
        }

        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.write().remove(key);
        Ok(())
    }
}
