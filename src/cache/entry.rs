//! Cache Entry Module
//!
//! Defines the request identity used as a cache key and the immutable
//! response snapshot stored under it.

use std::fmt;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use chrono::{DateTime, Utc};
use url::Url;

// == Request Key ==
/// Normalized request identity: method plus absolute URL without fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: Method,
    url: String,
}

impl RequestKey {
    /// Builds a key from a method and URL.
    ///
    /// Fragments never reach the network, so they are dropped from the identity.
    pub fn new(method: &Method, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.clone(),
            url: url.into(),
        }
    }

    /// Shorthand for a GET key.
    pub fn get(url: &Url) -> Self {
        Self::new(&Method::GET, url)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// == Response Snapshot ==
/// Immutable copy of a response: status, headers and body bytes.
///
/// `Bytes` makes cloning a snapshot cheap, so the same response can be handed
/// to the caller and to the cache writer.
#[derive(Debug, Clone)]
pub struct ResponseSnapshot {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Full response body
    pub body: Bytes,
    /// When the snapshot was taken
    pub stored_at: DateTime<Utc>,
}

impl ResponseSnapshot {
    // == Constructor ==
    /// Creates a snapshot stamped with the current time.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            stored_at: Utc::now(),
        }
    }

    /// Returns true if the response may be stored in a generation.
    ///
    /// Only exact 200 responses qualify; partial content and redirects do not.
    pub fn is_cacheable(&self) -> bool {
        self.status == StatusCode::OK
    }
}
