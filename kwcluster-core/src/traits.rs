//! Common traits for kwcluster.
//!
//! These traits define the seams between the cache, its durable storage, and
//! the webhook relay, so each side can be swapped for an in-memory fake.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::CrawlEvent;

// ═══════════════════════════════════════════════════════════════════════════════
// STORE TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// A durable string-keyed slot store.
///
/// Implementations might use:
/// - In-memory maps (for testing/development)
/// - One file per slot on local disk
/// - Browser local storage behind a wasm binding
///
/// Calls are synchronous and run to completion. Callers that share a store
/// across processes get last-writer-wins semantics.
pub trait Store: Send + Sync {
    /// Reads a slot. Returns `None` if the slot has never been written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a slot, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes a slot. Deleting a missing slot is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CRAWL EVENT SINK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Destination for crawl-progress events.
#[async_trait]
pub trait CrawlEventSink: Send + Sync {
    /// Records one event row.
    async fn insert(&self, event: CrawlEvent) -> Result<()>;
}
