//! Crawl event sinks.
//!
//! The webhook records every crawl-progress delivery as one row. These sinks
//! keep those rows in memory or append them to a JSON-lines file.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use kwcluster_core::error::{ClusterError, Result};
use kwcluster_core::traits::CrawlEventSink;
use kwcluster_core::types::CrawlEvent;

/// Events kept by a [`MemoryEventSink`] unless told otherwise.
pub const DEFAULT_MEMORY_EVENT_CAPACITY: usize = 1_000;

/// In-memory event sink.
///
/// Holds at most `capacity` events; once full, each insert drops the oldest.
#[derive(Debug)]
pub struct MemoryEventSink {
    events: RwLock<VecDeque<CrawlEvent>>,
    capacity: usize,
    failing: AtomicBool,
}

impl Default for MemoryEventSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_EVENT_CAPACITY)
    }
}

impl MemoryEventSink {
    /// Creates an empty sink with the default capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sink holding at most `capacity` events (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: RwLock::new(VecDeque::with_capacity(capacity.min(DEFAULT_MEMORY_EVENT_CAPACITY))),
            capacity,
            failing: AtomicBool::new(false),
        }
    }

    /// Maximum number of events kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Makes every subsequent insert fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns all recorded events in arrival order.
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Returns the events recorded for a domain.
    pub fn events_for(&self, domain: &str) -> Vec<CrawlEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.domain == domain)
            .cloned()
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl CrawlEventSink for MemoryEventSink {
    async fn insert(&self, event: CrawlEvent) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClusterError::EventSink("sink unavailable".into()));
        }
        let mut events = self.events.write();
        if events.len() >= self.capacity {
            events.pop_front();
        }
        events.push_back(event);
        Ok(())
    }
}

/// Appends events to a JSON-lines file, one object per line.
#[derive(Debug)]
pub struct JsonlEventSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlEventSink {
    /// Creates a sink appending to `path`. The file is created on first insert.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every event back from the file.
    pub async fn read_all(&self) -> Result<Vec<CrawlEvent>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(ClusterError::from))
            .collect()
    }
}

#[async_trait]
impl CrawlEventSink for JsonlEventSink {
    #[instrument(skip(self, event), fields(domain = %event.domain))]
    async fn insert(&self, event: CrawlEvent) -> Result<()> {
        let mut line = serde_json::to_vec(&event)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| ClusterError::EventSink(format!("open {}: {}", self.path.display(), e)))?;
        file.write_all(&line)
            .await
            .map_err(|e| ClusterError::EventSink(e.to_string()))?;
        file.flush().await?;

        debug!(id = %event.id, "Crawl event appended");
        Ok(())
    }
}
