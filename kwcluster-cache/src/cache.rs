//! Durable TTL cache for keyword-cluster indices.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use kwcluster_core::constants::{CACHE_STORAGE_KEY, MAX_AGE_MS, MAX_DOMAINS};
use kwcluster_core::types::{CacheEntry, CacheSnapshot, ClusterGroup};
use kwcluster_core::{Clock, Store, SystemClock};

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum entry age in milliseconds
    pub max_age_ms: u64,
    /// Maximum number of domains kept
    pub max_domains: usize,
    /// Storage slot holding the serialized cache
    pub storage_key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_ms: MAX_AGE_MS,
            max_domains: MAX_DOMAINS,
            storage_key: CACHE_STORAGE_KEY.to_string(),
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub live_entries: usize,
    pub expired_entries: usize,
    pub capacity: usize,
    pub max_age_ms: u64,
}

/// Advisory cache of keyword-cluster indices, keyed by domain.
///
/// Every call is a full read (and for writes, a full write) of one storage
/// slot. Nothing here returns an error: unreadable data is a miss and a
/// rejected write is dropped, because callers can always recompute the
/// clusters.
///
/// Keys are used exactly as given; only the empty string is rejected.
/// Writers sharing one `ClusterCache` are serialized, so concurrent saves
/// within a process never drop each other's entries.
pub struct ClusterCache<S, C = SystemClock> {
    store: S,
    clock: C,
    config: CacheConfig,
    write_lock: Mutex<()>,
}

impl<S: Store> ClusterCache<S> {
    /// Creates a cache over `store` with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, CacheConfig::default())
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(store: S, config: CacheConfig) -> Self {
        Self::with_clock(store, SystemClock, config)
    }
}

impl<S: Store, C: Clock> ClusterCache<S, C> {
    /// Creates a cache with an explicit clock.
    pub fn with_clock(store: S, clock: C, config: CacheConfig) -> Self {
        Self {
            store,
            clock,
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the cached clusters for `key` if they were built from `signature`.
    pub fn load(&self, key: &str, signature: &str) -> Option<Vec<ClusterGroup>> {
        if key.is_empty() {
            return None;
        }
        let mut snapshot = self.read_fresh();

        match snapshot.remove(key) {
            Some(entry) if entry.matches(signature) => {
                debug!(domain = %key, groups = entry.clusters.len(), "Cluster cache hit");
                Some(entry.clusters)
            }
            Some(_) => {
                debug!(domain = %key, "Cluster cache signature mismatch");
                None
            }
            None => {
                debug!(domain = %key, "Cluster cache miss");
                None
            }
        }
    }

    /// Stores `clusters` for `key`, stamped now.
    ///
    /// Expired entries are dropped and, past capacity, the oldest entries are
    /// evicted before the slot is written back.
    pub fn save(&self, key: &str, signature: &str, clusters: Vec<ClusterGroup>) {
        if key.is_empty() {
            debug!("Ignoring cluster cache save with empty key");
            return;
        }

        // Held across the whole read-modify-write.
        let _guard = self.write_lock.lock();

        let mut snapshot = self.read_fresh();
        let entry = CacheEntry::new(signature, clusters, self.clock.now_ms());
        snapshot.insert(key, entry);

        let evicted = snapshot.evict_oldest(self.config.max_domains);
        if !evicted.is_empty() {
            debug!(?evicted, "Evicted oldest cluster cache entries");
        }

        self.write(&snapshot);
        debug!(domain = %key, entries = snapshot.len(), "Cluster cache saved");
    }

    /// Live entries, newest first.
    pub fn entries(&self) -> Vec<(String, CacheEntry)> {
        let mut entries: Vec<_> = self.read_fresh().into_iter().collect();
        entries.sort_by(|(ka, a), (kb, b)| b.cached_at.cmp(&a.cached_at).then_with(|| ka.cmp(kb)));
        entries
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut snapshot = self.read_snapshot();
        let expired = snapshot.retain_fresh(self.clock.now_ms(), self.config.max_age_ms);
        CacheStats {
            live_entries: snapshot.len(),
            expired_entries: expired,
            capacity: self.config.max_domains,
            max_age_ms: self.config.max_age_ms,
        }
    }

    /// Deletes the whole cache slot.
    pub fn clear(&self) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.store.remove(&self.config.storage_key) {
            warn!(error = %e, key = %self.config.storage_key, "Failed to clear cluster cache");
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Reads the slot and drops expired entries. The filtered view is not
    /// written back.
    fn read_fresh(&self) -> CacheSnapshot {
        let mut snapshot = self.read_snapshot();
        let dropped = snapshot.retain_fresh(self.clock.now_ms(), self.config.max_age_ms);
        if dropped > 0 {
            debug!(dropped, "Skipped expired cluster cache entries");
        }
        snapshot
    }

    fn read_snapshot(&self) -> CacheSnapshot {
        let raw = match self.store.get(&self.config.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheSnapshot::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read cluster cache, treating as empty");
                return CacheSnapshot::new();
            }
        };

        CacheSnapshot::from_json(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Corrupt cluster cache, treating as empty");
            CacheSnapshot::new()
        })
    }

    fn write(&self, snapshot: &CacheSnapshot) {
        let result = snapshot
            .to_json()
            .and_then(|json| self.store.set(&self.config.storage_key, &json));

        if let Err(e) = result {
            warn!(error = %e, "Failed to persist cluster cache");
        }
    }
}
