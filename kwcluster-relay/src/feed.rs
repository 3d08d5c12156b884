//! Content-feed API client.
//!
//! Forwards a domain lookup to the third-party feed and hands back its JSON
//! untouched.

use std::time::Duration;

use tracing::{debug, instrument, warn};

use kwcluster_core::constants::CONTENT_FEED_API_KEY_HEADER;
use kwcluster_core::error::{ClusterError, Result};

/// Client for the content-feed API.
#[derive(Clone, Debug)]
pub struct ContentFeedClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl ContentFeedClient {
    /// Creates a client for `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout_secs: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ClusterError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key,
            http_client,
        })
    }

    /// Returns the configured endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Looks up a domain.
    ///
    /// Non-success answers become `ClusterError::Upstream` carrying the
    /// upstream status and body.
    #[instrument(skip(self))]
    pub async fn lookup(&self, domain: &str) -> Result<serde_json::Value> {
        let mut request = self
            .http_client
            .get(&self.base_url)
            .query(&[("domain", domain)]);

        if let Some(key) = &self.api_key {
            request = request.header(CONTENT_FEED_API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClusterError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Content feed returned an error");
            return Err(ClusterError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let json = response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ClusterError::Http(format!("invalid JSON from content feed: {}", e)))?;

        debug!("Content feed lookup succeeded");
        Ok(json)
    }
}
