//! Crawl-progress webhook types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::CRAWL_EVENT_TYPE;
use crate::error::{ClusterError, Result};

/// Payload delivered by the crawler's progress webhook.
///
/// Only `domain` is required. Fields the crawler adds later are kept in
/// `extra` and stored with the event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlProgress {
    /// Domain being crawled
    #[serde(default)]
    pub domain: String,
    /// Crawler status, e.g. "running" or "finished"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Pages crawled so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_crawled: Option<u64>,
    /// Total pages discovered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    /// Completion ratio or percentage as reported by the crawler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    /// Free-form message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CrawlProgress {
    /// Creates a payload for a domain.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Default::default()
        }
    }

    /// Checks that the payload names a domain.
    pub fn validate(&self) -> Result<()> {
        if self.domain.trim().is_empty() {
            return Err(ClusterError::Validation("domain is required".into()));
        }
        Ok(())
    }
}

/// A stored crawl event row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrawlEvent {
    /// Row id
    pub id: Uuid,
    /// Domain the event belongs to
    pub domain: String,
    /// Event kind
    pub event_type: String,
    /// Payload as received
    pub payload: serde_json::Value,
    /// When the webhook was received
    pub received_at: DateTime<Utc>,
}

impl CrawlEvent {
    /// Builds a crawl-progress event row from a validated payload.
    pub fn from_progress(progress: &CrawlProgress) -> Result<Self> {
        progress.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            domain: progress.domain.trim().to_string(),
            event_type: CRAWL_EVENT_TYPE.to_string(),
            payload: serde_json::to_value(progress)?,
            received_at: Utc::now(),
        })
    }
}
