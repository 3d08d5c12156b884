//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, error, info};

use kwcluster_cache::{CacheStats, ClusterCache};
use kwcluster_core::traits::Store;
use kwcluster_core::types::{normalize_domain, CrawlEvent, CrawlProgress};

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

type SharedCache = Arc<ClusterCache<Arc<dyn Store>>>;

/// Runs a cache operation on the blocking pool. Cache calls do synchronous
/// file I/O and must not stall the async workers.
async fn with_cache<T, F>(state: &AppState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&ClusterCache<Arc<dyn Store>>) -> T + Send + 'static,
{
    let cache: SharedCache = Arc::clone(&state.cache);
    tokio::task::spawn_blocking(move || op(&cache))
        .await
        .map_err(|e| {
            error!(error = %e, "Cluster cache task failed");
            ApiError::internal("cluster cache task failed")
        })
}

fn require_domain(raw: &str) -> Result<String> {
    normalize_domain(raw).ok_or_else(|| ApiError::validation("domain is required"))
}

/// GET /health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /api/v1/content-feed?domain=
pub async fn content_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ContentFeedQuery>,
) -> Result<Json<serde_json::Value>> {
    let domain = query
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::bad_request("domain query parameter is required"))?;

    let feed = state
        .feed
        .as_ref()
        .ok_or_else(|| ApiError::unavailable("content feed is not configured"))?;

    let json = feed.lookup(domain).await?;
    debug!(domain, "Relayed content feed lookup");
    Ok(Json(json))
}

/// POST /api/v1/webhooks/crawl-progress
///
/// Answers success once the payload is valid, whether or not the event row
/// could be stored. The crawler must never stall on our database.
pub async fn crawl_progress(
    State(state): State<Arc<AppState>>,
    Json(progress): Json<CrawlProgress>,
) -> Result<Json<WebhookAck>> {
    let event = CrawlEvent::from_progress(&progress)?;
    let domain = event.domain.clone();

    match state.events.insert(event).await {
        Ok(()) => info!(%domain, status = ?progress.status, "Recorded crawl progress"),
        Err(e) => error!(%domain, error = %e, "Failed to record crawl progress"),
    }

    Ok(Json(WebhookAck { success: true }))
}

/// GET /api/v1/clusters/:domain?signature=
///
/// The domain is trimmed and lowercased before it is used as a cache key.
pub async fn get_clusters(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
    Query(query): Query<SignatureQuery>,
) -> Result<Json<ClustersResponse>> {
    let domain = require_domain(&domain)?;
    let signature = query
        .signature
        .ok_or_else(|| ApiError::validation("signature query parameter is required"))?;

    let key = domain.clone();
    let clusters = with_cache(&state, move |cache| cache.load(&key, &signature))
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No cached clusters for {}", domain)))?;

    Ok(Json(ClustersResponse { domain, clusters }))
}

/// PUT /api/v1/clusters/:domain
pub async fn put_clusters(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
    Json(req): Json<SaveClustersRequest>,
) -> Result<StatusCode> {
    let domain = require_domain(&domain)?;

    debug!(%domain, groups = req.clusters.len(), "Saving clusters");
    with_cache(&state, move |cache| cache.save(&domain, &req.signature, req.clusters)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/cache/stats
pub async fn cache_stats(State(state): State<Arc<AppState>>) -> Result<Json<CacheStats>> {
    let stats = with_cache(&state, |cache| cache.stats()).await?;
    Ok(Json(stats))
}
