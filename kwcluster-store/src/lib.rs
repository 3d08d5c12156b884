//! # kwcluster Store
//!
//! Storage backends for the keyword-cluster cache and the crawl webhook.
//!
//! - **Memory**: in-process slot store with an optional byte quota
//! - **File**: one file per slot, written atomically
//! - **Event sinks**: in-memory and JSON-lines destinations for crawl events
//!
//! ## Example
//!
//! ```rust
//! use kwcluster_store::MemoryStore;
//! use kwcluster_core::Store;
//!
//! let store = MemoryStore::new();
//! store.set("keyword_clusters_v1", "{}").unwrap();
//! assert_eq!(store.get("keyword_clusters_v1").unwrap().as_deref(), Some("{}"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod events;
mod file;
mod memory;

pub use events::{JsonlEventSink, MemoryEventSink, DEFAULT_MEMORY_EVENT_CAPACITY};
pub use file::FileStore;
pub use memory::MemoryStore;

// Re-export the traits from core
pub use kwcluster_core::traits::{CrawlEventSink, Store};
