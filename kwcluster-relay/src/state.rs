//! App state: config, content-feed client, cluster cache, event sink.

use std::path::PathBuf;
use std::sync::Arc;

use kwcluster_cache::{CacheConfig, ClusterCache};
use kwcluster_core::constants::DEFAULT_UPSTREAM_TIMEOUT_SECS;
use kwcluster_core::error::{ClusterError, Result};
use kwcluster_core::traits::{CrawlEventSink, Store};
use kwcluster_store::{FileStore, JsonlEventSink};

use crate::feed::ContentFeedClient;

const DEFAULT_CACHE_DIR: &str = ".kwcluster";
const DEFAULT_CRAWL_EVENTS_FILE: &str = "crawl_events.jsonl";

/// Relay configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Content-feed endpoint; the relay answers 503 when unset
    pub content_feed_url: Option<String>,
    /// API key sent to the content feed
    pub content_feed_api_key: Option<String>,
    /// Upstream request timeout in seconds
    pub upstream_timeout_secs: u64,
    /// Directory of the durable cluster cache
    pub cache_dir: PathBuf,
    /// JSON-lines file for crawl events; `<cache_dir>/crawl_events.jsonl` when unset
    pub crawl_events_path: Option<PathBuf>,
    /// Cluster cache limits
    pub cache: CacheConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            content_feed_url: None,
            content_feed_api_key: None,
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            crawl_events_path: None,
            cache: CacheConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Loads configuration from `.env` and the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let upstream_timeout_secs = match std::env::var("CONTENT_FEED_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                ClusterError::Config(format!("CONTENT_FEED_TIMEOUT_SECS is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_UPSTREAM_TIMEOUT_SECS,
        };

        let config = Self {
            content_feed_url: non_empty_var("CONTENT_FEED_URL"),
            content_feed_api_key: non_empty_var("CONTENT_FEED_API_KEY"),
            upstream_timeout_secs,
            cache_dir: non_empty_var("KWCLUSTER_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR)),
            crawl_events_path: non_empty_var("CRAWL_EVENTS_PATH").map(PathBuf::from),
            cache: CacheConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the content-feed URL, if any, is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if let Some(raw) = &self.content_feed_url {
            let parsed = url::Url::parse(raw)
                .map_err(|e| ClusterError::Config(format!("invalid CONTENT_FEED_URL '{}': {}", raw, e)))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ClusterError::Config(format!(
                    "CONTENT_FEED_URL must be http or https, got '{}'",
                    parsed.scheme()
                )));
            }
        }
        if self.upstream_timeout_secs == 0 {
            return Err(ClusterError::Config("upstream timeout must be positive".into()));
        }
        Ok(())
    }

    /// Where crawl events are appended.
    pub fn crawl_events_file(&self) -> PathBuf {
        self.crawl_events_path
            .clone()
            .unwrap_or_else(|| self.cache_dir.join(DEFAULT_CRAWL_EVENTS_FILE))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Shared state behind every handler.
pub struct AppState {
    /// Active configuration
    pub config: RelayConfig,
    /// Content-feed client, absent when no URL is configured
    pub feed: Option<ContentFeedClient>,
    /// Cluster cache, shared with blocking tasks
    pub cache: Arc<ClusterCache<Arc<dyn Store>>>,
    /// Destination of crawl events
    pub events: Arc<dyn CrawlEventSink>,
}

impl AppState {
    /// Builds state with a file-backed cache and a JSON-lines event sink.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let store: Arc<dyn Store> = Arc::new(FileStore::new(&config.cache_dir));
        let events: Arc<dyn CrawlEventSink> = Arc::new(JsonlEventSink::new(config.crawl_events_file()));
        Self::with_parts(config, store, events)
    }

    /// Builds state around explicit storage backends.
    pub fn with_parts(
        config: RelayConfig,
        store: Arc<dyn Store>,
        events: Arc<dyn CrawlEventSink>,
    ) -> Result<Self> {
        config.validate()?;

        let feed = match &config.content_feed_url {
            Some(url) => Some(ContentFeedClient::new(
                url,
                config.content_feed_api_key.clone(),
                config.upstream_timeout_secs,
            )?),
            None => None,
        };

        Ok(Self {
            cache: Arc::new(ClusterCache::with_config(store, config.cache.clone())),
            config,
            feed,
            events,
        })
    }
}
