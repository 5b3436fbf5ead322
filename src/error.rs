//! Error types for the shell vault server
//!
//! Provides typed errors for each concern using thiserror. The HTTP-facing
//! errors render as `{"error": ...}` JSON bodies.

use axum::{
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error ==
/// Errors reported by a [`crate::backup::BlobStore`] implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists at the requested path
    #[error("Object not found: {0}")]
    NotFound(String),

    /// The backing store could not complete the operation
    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

// == Gateway Error ==
/// Errors surfaced by the backup gateway endpoint.
///
/// The three failure classes (client error, not found, server error) stay
/// distinguishable by both status code and body.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The `backupId` query parameter was absent or empty
    #[error("Missing backupId parameter")]
    MissingId,

    /// The identifier would escape the backup namespace
    #[error("Invalid backupId parameter")]
    InvalidId,

    /// The query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// The body is larger than the accepted backup size
    #[error("Backup exceeds the maximum size")]
    PayloadTooLarge,

    /// No backup has ever been written under this identifier
    #[error("Backup not found")]
    NotFound,

    /// The request method is neither a read nor a write
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Body parse or store failure; details are logged, not returned
    #[error("Internal server error")]
    Internal(String),
}

impl From<StoreError> for GatewayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => GatewayError::NotFound,
            StoreError::Backend(msg) => GatewayError::Internal(msg),
        }
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::InvalidQuery(rejection.body_text())
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            GatewayError::PayloadTooLarge
        } else {
            GatewayError::Internal(rejection.body_text())
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::MissingId | GatewayError::InvalidId | GatewayError::InvalidQuery(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Upstream Error ==
/// Failure to reach the upstream origin at all.
///
/// An upstream that answers with a non-200 status is not an error; only
/// transport failures (offline, refused, timed out) land here.
#[derive(Error, Debug, Clone)]
pub enum UpstreamError {
    /// The network is unreachable or the connection failed
    #[error("Network unavailable: {0}")]
    Unavailable(String),

    /// The request could not be built for the upstream
    #[error("Invalid upstream request: {0}")]
    InvalidRequest(String),
}

// == Worker Error ==
/// Errors from the offline cache worker lifecycle and fetch handling.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// A shell asset could not be fetched or was not a 200 response
    #[error("Install failed on asset '{asset}': {reason}")]
    InstallFailed { asset: String, reason: String },

    /// `activate` was called with no installed generation waiting
    #[error("No installed generation is waiting to activate")]
    NothingToActivate,

    /// The request is not routable against the configured origin
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Network failed and neither a cache entry nor an offline fallback exists
    #[error("Offline and no cached response for {0}")]
    Unavailable(String),

    /// A passthrough request failed on the network
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkerError::InstallFailed { .. } => StatusCode::BAD_GATEWAY,
            WorkerError::NothingToActivate => StatusCode::CONFLICT,
            WorkerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WorkerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            WorkerError::Upstream(UpstreamError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            WorkerError::Upstream(UpstreamError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, GatewayError>;
