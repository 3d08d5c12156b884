//! Constants for the keyword-cluster cache and relays.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum age of a cache entry before it is treated as absent (24 hours).
pub const MAX_AGE_MS: u64 = 24 * 60 * 60 * 1000;

/// Maximum number of domains tracked at once.
pub const MAX_DOMAINS: usize = 25;

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE KEY & SCHEMA VERSIONING
// ═══════════════════════════════════════════════════════════════════════════════
// Bumping SCHEMA_VERSION orphans data written under the previous key.
// Nothing migrates it; the cache is advisory and simply starts cold.

/// Namespace of the cache slot in durable storage.
pub const CACHE_NAMESPACE: &str = "keyword_clusters";

/// Current schema version of the serialized cache slot.
pub const SCHEMA_VERSION: u32 = 1;

/// Storage key of the cache slot: namespace plus version suffix.
/// Must stay in step with `CACHE_NAMESPACE` and `SCHEMA_VERSION`.
pub const CACHE_STORAGE_KEY: &str = "keyword_clusters_v1";

/// Builds the storage key for an arbitrary schema version.
pub fn storage_key_for_version(version: u32) -> String {
    format!("{}_v{}", CACHE_NAMESPACE, version)
}

// ═══════════════════════════════════════════════════════════════════════════════
// RELAYS
// ═══════════════════════════════════════════════════════════════════════════════

/// Event type recorded for crawl-progress webhook deliveries.
pub const CRAWL_EVENT_TYPE: &str = "crawl_progress";

/// Default port of the relay server.
pub const DEFAULT_RELAY_PORT: u16 = 3001;

/// Default timeout for upstream content-feed requests, in seconds.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

/// Header carrying the content-feed API key.
pub const CONTENT_FEED_API_KEY_HEADER: &str = "x-api-key";
