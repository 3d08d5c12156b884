//! # kwcluster Core
//!
//! Core types, errors, and traits shared by the keyword-cluster cache, its
//! storage backends, and the HTTP relays.
//!
//! - **Types**: cluster groups, cache entries, crawl-progress events
//! - **Errors**: one error enum with classification helpers
//! - **Constants**: cache limits and the versioned storage key
//! - **Traits**: `Store`, `Clock`, and `CrawlEventSink` seams
//! - **Signature**: fingerprinting of keyword sets
//!
//! ## Example
//!
//! ```rust
//! use kwcluster_core::{ClusterGroup, KeywordId, keyword_signature};
//!
//! let group = ClusterGroup::new(KeywordId::Int(1), vec![KeywordId::from("kw-2")]);
//! let json = serde_json::to_string(&group).unwrap();
//! assert!(json.contains("parentId"));
//!
//! let sig = keyword_signature(["seo tools", "Rank Tracker"]);
//! assert_eq!(sig.len(), 64);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod clock;
pub mod constants;
pub mod error;
pub mod signature;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use constants::*;
pub use error::{ClusterError, Result};
pub use signature::keyword_signature;
pub use traits::*;
pub use types::*;
