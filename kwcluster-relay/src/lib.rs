//! # kwcluster Relay
//!
//! HTTP server sitting between the dashboard and its outside collaborators.
//!
//! ## Endpoints
//!
//! - `GET /health` - Liveness check
//! - `GET /api/v1/content-feed?domain=` - Relay a domain lookup to the content-feed API
//! - `POST /api/v1/webhooks/crawl-progress` - Record a crawler progress callback
//! - `GET /api/v1/clusters/:domain?signature=` - Read a cached cluster index
//! - `PUT /api/v1/clusters/:domain` - Store a cluster index
//! - `GET /api/v1/cache/stats` - Cluster cache statistics
//!
//! ## Example
//!
//! ```rust,ignore
//! use kwcluster_relay::{RelayConfig, RelayServer};
//!
//! let config = RelayConfig::from_env()?;
//! let server = RelayServer::new(config)?;
//! server.run(([0, 0, 0, 0], 3001)).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod dto;
mod error;
mod feed;
mod handlers;
mod routes;
mod state;

pub use error::ApiError;
pub use feed::ContentFeedClient;
pub use routes::create_router;
pub use state::{AppState, RelayConfig};

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use kwcluster_core::Result;

/// Relay server.
pub struct RelayServer {
    state: Arc<AppState>,
}

impl RelayServer {
    /// Creates a server backed by the stores named in `config`.
    pub fn new(config: RelayConfig) -> Result<Self> {
        Ok(Self::with_state(AppState::new(config)?))
    }

    /// Creates a server around prepared state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Creates the router with all routes configured.
    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        create_router(self.state.clone())
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Runs the server on the given address.
    pub async fn run(self, addr: impl Into<SocketAddr>) -> std::io::Result<()> {
        let addr = addr.into();
        let listener = tokio::net::TcpListener::bind(addr).await?;

        info!("kwcluster relay listening on {}", addr);

        axum::serve(listener, self.router()).await
    }
}
