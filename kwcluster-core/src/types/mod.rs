//! Domain types for kwcluster.
//!
//! - [`ClusterGroup`]: one parent keyword and its children
//! - [`CacheEntry`]: a cached cluster index with its input signature
//! - [`CacheSnapshot`]: the whole cache slot, keyed by domain
//! - [`normalize_domain`]: canonical cache key for user-supplied domains
//! - [`CrawlProgress`] / [`CrawlEvent`]: crawl webhook payload and stored row

mod cluster;
mod crawl;
mod entry;

pub use cluster::*;
pub use crawl::*;
pub use entry::*;
