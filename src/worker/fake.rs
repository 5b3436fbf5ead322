//! In-memory upstream for exercising the worker without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};

use crate::cache::ResponseSnapshot;
use crate::error::UpstreamError;
use crate::worker::{FetchRequest, Upstream};

/// Serves canned responses by absolute URL and can be switched offline.
///
/// Unknown URLs answer 404, like a real origin would.
#[derive(Debug, Default)]
pub struct FakeUpstream {
    routes: Mutex<HashMap<String, (StatusCode, Bytes)>>,
    offline: AtomicBool,
    calls: AtomicU64,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response for `url`, replacing any previous one.
    pub fn route(&self, url: &str, status: StatusCode, body: impl Into<Bytes>) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.insert(url.to_string(), (status, body.into()));
        }
    }

    /// Builder form of [`FakeUpstream::route`] for a 200 response.
    pub fn with_route(self, url: &str, body: impl Into<Bytes>) -> Self {
        self.route(url, StatusCode::OK, body);
        self
    }

    /// While offline every fetch fails with `UpstreamError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of fetches attempted, online or not.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(UpstreamError::Unavailable("offline".to_string()));
        }

        let found = self
            .routes
            .lock()
            .map_err(|_| UpstreamError::Unavailable("route table poisoned".to_string()))?
            .get(request.url.as_str())
            .cloned();

        let (status, body) = found.unwrap_or((StatusCode::NOT_FOUND, Bytes::new()));
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        Ok(ResponseSnapshot::new(status, headers, body))
    }
}
