//! Upstream Module
//!
//! The network side of the worker. `Upstream` is the seam between the
//! caching policy and the transport, so the policy can be exercised offline.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::cache::ResponseSnapshot;
use crate::error::UpstreamError;
use crate::worker::{strip_hop_by_hop, FetchRequest};

/// Performs a live network request.
///
/// Implementations must return `Ok` for any response the server produced,
/// whatever its status, and `Err` only when no response was received.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, UpstreamError>;
}

// == HTTP Upstream ==
/// [`Upstream`] backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
}

impl HttpUpstream {
    // == Constructor ==
    /// Creates an upstream client with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::InvalidRequest(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &FetchRequest) -> Result<ResponseSnapshot, UpstreamError> {
        let mut headers = request.headers.clone();
        // reqwest derives Host from the target URL
        headers.remove(reqwest::header::HOST);

        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers)
            .body(request.body.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    UpstreamError::InvalidRequest(e.to_string())
                } else {
                    UpstreamError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        let mut headers = response.headers().clone();
        strip_hop_by_hop(&mut headers);
        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        debug!("Upstream {} {} -> {}", request.method, request.url, status);
        Ok(ResponseSnapshot::new(status, headers, body))
    }
}
