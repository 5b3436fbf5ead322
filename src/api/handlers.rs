//! API Handlers
//!
//! HTTP request handlers for the backup gateway, the worker controls and the
//! intercepting proxy.

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;

use crate::backup::{BackupGateway, BlobStore, FsBlobStore, MemoryBlobStore};
use crate::cache::ResponseSnapshot;
use crate::config::Config;
use crate::error::{GatewayError, Result, WorkerError};
use crate::models::{BackupQuery, BackupSavedResponse, HealthResponse, UpdateRequest};
use crate::worker::{
    FetchRequest, FetchSource, HttpUpstream, ServiceWorker, WorkerConfig, WorkerStatus,
};

/// Response header naming where a proxied response came from.
pub const SOURCE_HEADER: &str = "x-shell-vault-source";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Offline cache worker
    pub worker: Arc<ServiceWorker>,
    /// Backup document gateway
    pub backups: BackupGateway,
}

impl AppState {
    /// Creates a new AppState from a worker and a gateway.
    pub fn new(worker: ServiceWorker, backups: BackupGateway) -> Self {
        Self {
            worker: Arc::new(worker),
            backups,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Uses a filesystem backup store when `backup_dir` is set and an
    /// in-memory one otherwise.
    pub fn from_config(config: &Config) -> std::result::Result<Self, WorkerError> {
        let timeout = std::time::Duration::from_secs(config.upstream_timeout);
        let upstream = HttpUpstream::new(timeout)?;
        let worker = ServiceWorker::new(WorkerConfig::from_config(config)?, Arc::new(upstream));

        let store: Arc<dyn BlobStore> = match &config.backup_dir {
            Some(dir) => {
                info!("Backups stored under {}", dir.display());
                Arc::new(FsBlobStore::new(dir))
            }
            None => {
                info!("Backups held in memory");
                Arc::new(MemoryBlobStore::new())
            }
        };

        Ok(Self::new(worker, BackupGateway::new(store)))
    }
}

/// Handler for POST /api/backup?backupId=
///
/// Replaces the backup document stored under the identifier. Extractor
/// rejections are answered as JSON gateway errors like every other failure.
pub async fn write_backup_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<BackupQuery>, QueryRejection>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Json<BackupSavedResponse>> {
    let Query(query) = query?;
    let body = body?;

    state
        .backups
        .write(query.backup_id.as_deref(), &body)
        .await?;

    Ok(Json(BackupSavedResponse::new()))
}

/// Handler for GET /api/backup?backupId=
///
/// Returns the stored backup document verbatim.
pub async fn read_backup_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<BackupQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query?;
    let document = state.backups.read(query.backup_id.as_deref()).await?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        document,
    )
        .into_response())
}

/// Handler for any other method on /api/backup
pub async fn backup_method_not_allowed() -> GatewayError {
    GatewayError::MethodNotAllowed
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.worker.active_generation().await))
}

/// Handler for GET /sw/status
pub async fn worker_status_handler(State(state): State<AppState>) -> Json<WorkerStatus> {
    Json(state.worker.status().await)
}

/// Handler for POST /sw/update
///
/// Installs the requested generation and activates it.
pub async fn worker_update_handler(
    State(state): State<AppState>,
    Json(req): Json<UpdateRequest>,
) -> std::result::Result<Json<WorkerStatus>, WorkerError> {
    if let Some(error_msg) = req.validate() {
        return Err(WorkerError::InvalidRequest(error_msg));
    }

    state.worker.update(req.version.trim()).await?;
    Ok(Json(state.worker.status().await))
}

/// Fallback handler: every request not matched above goes through the worker.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Response, WorkerError> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = state.worker.config().resolve(path_and_query)?;

    let outcome = state
        .worker
        .handle_fetch(FetchRequest::new(method, url, headers, body))
        .await?;

    // The background cache write keeps running once its handle is dropped
    Ok(snapshot_response(outcome.response, outcome.source))
}

/// Rebuilds an HTTP response from a snapshot, tagging its source.
fn snapshot_response(snapshot: ResponseSnapshot, source: FetchSource) -> Response {
    let mut response = Response::new(Body::from(snapshot.body));
    *response.status_mut() = snapshot.status;
    *response.headers_mut() = snapshot.headers;
    response
        .headers_mut()
        .insert(SOURCE_HEADER, HeaderValue::from_static(source.as_str()));
    response
}
