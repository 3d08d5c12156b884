//! Error types for kwcluster.
//!
//! Library crates return `ClusterError`. The cache itself never surfaces
//! these to its callers; it logs and degrades to a miss or a no-op.

use thiserror::Error;

/// Result type alias using `ClusterError`.
pub type Result<T> = std::result::Result<T, ClusterError>;

/// Main error type for all kwcluster operations.
#[derive(Debug, Error)]
pub enum ClusterError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Stored cache data is corrupt or has the wrong shape.
    #[error("Cache deserialization failed: {0}")]
    Deserialization(String),

    /// Durable storage rejected a write.
    #[error("Cache persistence failed: {0}")]
    Persistence(String),

    /// A write would exceed the store's byte quota.
    #[error("Storage quota exceeded: limit {limit} bytes, requested {requested}")]
    QuotaExceeded { limit: usize, requested: usize },

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION / IO ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION / CONFIG ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Input validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Upstream API answered with a non-success status.
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENT SINK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Recording a crawl event failed.
    #[error("Event sink error: {0}")]
    EventSink(String),
}

impl ClusterError {
    /// Returns true if this error belongs to the cache's storage path.
    pub fn is_cache_error(&self) -> bool {
        matches!(
            self,
            ClusterError::Deserialization(_)
                | ClusterError::Persistence(_)
                | ClusterError::QuotaExceeded { .. }
        )
    }

    /// Returns true if this error is recoverable (can retry).
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClusterError::Http(_) => true,
            ClusterError::Upstream { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Returns true if this is a validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ClusterError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClusterError::QuotaExceeded {
            limit: 5120,
            requested: 9000,
        };
        assert!(err.to_string().contains("5120"));
        assert!(err.to_string().contains("9000"));
    }

    #[test]
    fn test_error_classification() {
        assert!(ClusterError::Deserialization("bad".into()).is_cache_error());
        assert!(ClusterError::Persistence("full".into()).is_cache_error());
        assert!(!ClusterError::Http("reset".into()).is_cache_error());

        assert!(ClusterError::Http("reset".into()).is_recoverable());
        assert!(ClusterError::Upstream { status: 503, body: String::new() }.is_recoverable());
        assert!(ClusterError::Upstream { status: 429, body: String::new() }.is_recoverable());
        assert!(!ClusterError::Upstream { status: 404, body: String::new() }.is_recoverable());
        assert!(!ClusterError::Validation("domain".into()).is_recoverable());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("{oops");
        let result: Result<serde_json::Value> = json_result.map_err(ClusterError::from);
        assert!(matches!(result, Err(ClusterError::Json(_))));
    }
}
