//! API Routes
//!
//! Configures the Axum router with the service endpoints and the proxy fallback.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::backup::MAX_BACKUP_SIZE;

use super::handlers::{
    backup_method_not_allowed, health_handler, proxy_handler, read_backup_handler,
    worker_status_handler, worker_update_handler, write_backup_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/backup?backupId=` - Store a backup document (up to `MAX_BACKUP_SIZE`)
/// - `GET /api/backup?backupId=` - Retrieve a backup document
/// - `GET /health` - Health check endpoint
/// - `GET /sw/status` - Worker lifecycle and cache counters
/// - `POST /sw/update` - Install and activate a new cache generation
/// - anything else - Proxied to the shell origin through the worker
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/backup",
            get(read_backup_handler)
                .post(write_backup_handler)
                .fallback(backup_method_not_allowed)
                .layer(DefaultBodyLimit::max(MAX_BACKUP_SIZE)),
        )
        .route("/health", get(health_handler))
        .route("/sw/status", get(worker_status_handler))
        .route("/sw/update", post(worker_update_handler))
        .fallback(proxy_handler)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::backup::{BackupGateway, MemoryBlobStore};
    use crate::worker::{FakeUpstream, ServiceWorker, WorkerConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let config = WorkerConfig::new("http://shell.test", "v1", &[], &[], "/index.html").unwrap();
        let worker = ServiceWorker::new(config, Arc::new(FakeUpstream::new()));
        let state = AppState::new(worker, BackupGateway::new(Arc::new(MemoryBlobStore::new())));
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/sw/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_backup_delete_not_allowed() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/backup?backupId=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_backup_missing_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/backup")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_backup_duplicate_id_is_json_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/backup?backupId=a&backupId=b")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()["content-type"], "application/json");
    }

    #[tokio::test]
    async fn test_backup_body_above_default_limit_accepted() {
        let app = create_test_app();
        // Larger than axum's 2 MB default, below MAX_BACKUP_SIZE
        let body = format!(r#"{{"blob":"{}"}}"#, "x".repeat(3 * 1024 * 1024));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/backup?backupId=big")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_proxy_unknown_path_not_found_upstream() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nothing-here.js")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
