//! API route configuration.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Outbound relay
        .route("/api/v1/content-feed", get(handlers::content_feed))

        // Inbound webhooks
        .route("/api/v1/webhooks/crawl-progress", post(handlers::crawl_progress))

        // Cluster cache
        .route(
            "/api/v1/clusters/:domain",
            get(handlers::get_clusters).put(handlers::put_clusters),
        )
        .route("/api/v1/cache/stats", get(handlers::cache_stats))

        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use kwcluster_core::traits::{CrawlEventSink, Store};
    use kwcluster_store::{MemoryEventSink, MemoryStore};
    use tower::ServiceExt;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::state::RelayConfig;

    struct TestApp {
        router: Router,
        events: Arc<MemoryEventSink>,
    }

    fn test_app_with(config: RelayConfig) -> TestApp {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let events = Arc::new(MemoryEventSink::new());
        let sink: Arc<dyn CrawlEventSink> = events.clone();
        let state = AppState::with_parts(config, store, sink).unwrap();
        TestApp {
            router: create_router(Arc::new(state)),
            events,
        }
    }

    fn test_app() -> TestApp {
        test_app_with(RelayConfig::default())
    }

    async fn send(router: &Router, request: Request<Body>) -> Response {
        router.clone().oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = test_app();
        let response = send(&app.router, get_request("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_content_feed_requires_domain() {
        let app = test_app();
        let response = send(&app.router, get_request("/api/v1/content-feed")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app.router, get_request("/api/v1/content-feed?domain=%20")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_content_feed_unconfigured() {
        let app = test_app();
        let response = send(&app.router, get_request("/api/v1/content-feed?domain=example.com")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_content_feed_relays_json() {
        let server = MockServer::start().await;
        let upstream = serde_json::json!({ "domain": "example.com", "items": [{ "title": "hello" }] });
        Mock::given(method("GET"))
            .and(query_param("domain", "example.com"))
            .respond_with(ResponseTemplate::new(200).set_body_json(upstream.clone()))
            .mount(&server)
            .await;

        let app = test_app_with(RelayConfig {
            content_feed_url: Some(server.uri()),
            ..RelayConfig::default()
        });
        let response = send(&app.router, get_request("/api/v1/content-feed?domain=example.com")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, upstream);
    }

    #[tokio::test]
    async fn test_content_feed_propagates_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown domain"))
            .mount(&server)
            .await;

        let app = test_app_with(RelayConfig {
            content_feed_url: Some(server.uri()),
            ..RelayConfig::default()
        });
        let response = send(&app.router, get_request("/api/v1/content-feed?domain=nope.com")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(body["error"]["message"], "unknown domain");
    }

    #[tokio::test]
    async fn test_crawl_progress_records_event() {
        let app = test_app();
        let payload = serde_json::json!({ "domain": "example.com", "status": "running", "pagesCrawled": 12 });
        let response = send(
            &app.router,
            json_request("POST", "/api/v1/webhooks/crawl-progress", payload),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);

        let events = app.events.events_for("example.com");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].payload["pagesCrawled"], 12);
    }

    #[tokio::test]
    async fn test_crawl_progress_requires_domain() {
        let app = test_app();
        let response = send(
            &app.router,
            json_request("POST", "/api/v1/webhooks/crawl-progress", serde_json::json!({ "status": "running" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
        assert!(app.events.is_empty());
    }

    #[tokio::test]
    async fn test_crawl_progress_succeeds_when_sink_fails() {
        let app = test_app();
        app.events.set_failing(true);

        let response = send(
            &app.router,
            json_request("POST", "/api/v1/webhooks/crawl-progress", serde_json::json!({ "domain": "example.com" })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);
        assert!(app.events.is_empty());
    }

    #[tokio::test]
    async fn test_clusters_put_then_get() {
        let app = test_app();
        let body = serde_json::json!({
            "signature": "sig-1",
            "clusters": [{ "parentId": 1, "childIds": [2, "kw-3"] }]
        });
        let response = send(&app.router, json_request("PUT", "/api/v1/clusters/Example.com", body)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app.router, get_request("/api/v1/clusters/example.com?signature=sig-1")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["clusters"][0]["childIds"][1], "kw-3");
    }

    #[tokio::test]
    async fn test_clusters_signature_mismatch_is_not_found() {
        let app = test_app();
        let body = serde_json::json!({ "signature": "sig-1", "clusters": [] });
        send(&app.router, json_request("PUT", "/api/v1/clusters/example.com", body)).await;

        let response = send(&app.router, get_request("/api/v1/clusters/example.com?signature=sig-2")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clusters_get_requires_signature() {
        let app = test_app();
        let response = send(&app.router, get_request("/api/v1/clusters/example.com")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "signature query parameter is required");
    }

    #[tokio::test]
    async fn test_clusters_blank_domain_is_rejected() {
        let app = test_app();
        let body = serde_json::json!({ "signature": "s", "clusters": [] });
        let response = send(&app.router, json_request("PUT", "/api/v1/clusters/%20%20", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = send(&app.router, get_request("/api/v1/clusters/%20?signature=s")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts_keep_every_domain() {
        let app = test_app();
        let body = serde_json::json!({ "signature": "s", "clusters": [] });

        let tasks: Vec<_> = (0..20)
            .map(|i| {
                let router = app.router.clone();
                let body = body.clone();
                tokio::spawn(async move {
                    let uri = format!("/api/v1/clusters/d{}.com", i);
                    send(&router, json_request("PUT", &uri, body)).await.status()
                })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap(), StatusCode::NO_CONTENT);
        }

        let response = send(&app.router, get_request("/api/v1/cache/stats")).await;
        assert_eq!(body_json(response).await["live_entries"], 20);
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let app = test_app();
        let body = serde_json::json!({ "signature": "s", "clusters": [] });
        send(&app.router, json_request("PUT", "/api/v1/clusters/a.com", body.clone())).await;
        send(&app.router, json_request("PUT", "/api/v1/clusters/b.com", body)).await;

        let response = send(&app.router, get_request("/api/v1/cache/stats")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["live_entries"], 2);
        assert_eq!(json["capacity"], 25);
    }
}
