//! Bounded TTL cache for keyword-cluster indices.
//!
//! One durable slot holds the latest cluster index per domain, invalidated by
//! age, by input signature, and by a cap on tracked domains.

mod cache;

pub use cache::{CacheConfig, CacheStats, ClusterCache};
