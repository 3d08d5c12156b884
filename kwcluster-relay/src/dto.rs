//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use kwcluster_core::types::ClusterGroup;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// Query for the content-feed relay.
#[derive(Debug, Deserialize)]
pub struct ContentFeedQuery {
    /// Domain to look up
    pub domain: Option<String>,
}

/// Acknowledgement returned to the crawler.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    /// True whenever the payload was accepted, even if recording it failed
    pub success: bool,
}

/// Query for reading cached clusters.
#[derive(Debug, Deserialize)]
pub struct SignatureQuery {
    /// Signature of the caller's current keyword set; required
    pub signature: Option<String>,
}

/// Cached clusters for a domain.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClustersResponse {
    /// Normalized domain
    pub domain: String,
    /// Cached cluster index
    pub clusters: Vec<ClusterGroup>,
}

/// Request to store clusters for a domain.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveClustersRequest {
    /// Signature of the keyword set that produced `clusters`
    pub signature: String,
    /// Cluster index to cache
    pub clusters: Vec<ClusterGroup>,
}
