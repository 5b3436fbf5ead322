//! Fetch Request Module
//!
//! The worker's view of an intercepted request.

use axum::body::Bytes;
use axum::http::{header, HeaderMap, HeaderName, Method};
use url::Url;

use crate::cache::RequestKey;

/// Headers that describe one connection and must not be forwarded or stored.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

// == Fetch Request ==
/// An intercepted request addressed to an absolute URL.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// True when the request loads a whole page rather than a sub-resource
    pub navigation: bool,
}

impl FetchRequest {
    // == Constructor ==
    /// Builds a request and infers whether it is a navigation from its headers.
    pub fn new(method: Method, url: Url, headers: HeaderMap, body: Bytes) -> Self {
        let navigation = is_navigation(&method, &headers);
        let mut headers = headers;
        strip_hop_by_hop(&mut headers);
        Self {
            method,
            url,
            headers,
            body,
            navigation,
        }
    }

    /// A bodiless GET for a sub-resource, as issued when seeding shell assets.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            navigation: false,
        }
    }

    /// Marks the request as a page navigation.
    pub fn navigate(mut self) -> Self {
        self.navigation = true;
        self
    }

    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// Decides whether a request is a page navigation.
///
/// `Sec-Fetch-Mode` is authoritative when present; otherwise a GET whose
/// `Accept` header lists `text/html` is treated as one.
pub fn is_navigation(method: &Method, headers: &HeaderMap) -> bool {
    if let Some(mode) = headers
        .get("sec-fetch-mode")
        .and_then(|v| v.to_str().ok())
    {
        return mode.eq_ignore_ascii_case("navigate");
    }

    *method == Method::GET
        && headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(|accept| accept.contains("text/html"))
            .unwrap_or(false)
}

/// Removes connection-scoped headers, including those named by `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(*name);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_sec_fetch_mode_navigate() {
        let h = headers(&[("sec-fetch-mode", "navigate")]);
        assert!(is_navigation(&Method::GET, &h));
    }

    #[test]
    fn test_sec_fetch_mode_overrides_accept() {
        let h = headers(&[("sec-fetch-mode", "cors"), ("accept", "text/html")]);
        assert!(!is_navigation(&Method::GET, &h));
    }

    #[test]
    fn test_accept_html_fallback() {
        let h = headers(&[("accept", "text/html,application/xhtml+xml")]);
        assert!(is_navigation(&Method::GET, &h));
        assert!(!is_navigation(&Method::POST, &h));
        assert!(!is_navigation(&Method::GET, &headers(&[("accept", "text/css")])));
    }

    #[test]
    fn test_strip_hop_by_hop() {
        let mut h = headers(&[
            ("connection", "keep-alive, x-session"),
            ("x-session", "abc"),
            ("transfer-encoding", "chunked"),
            ("content-type", "text/html"),
        ]);
        strip_hop_by_hop(&mut h);
        assert!(h.get("x-session").is_none());
        assert!(h.get("transfer-encoding").is_none());
        assert!(h.get("connection").is_none());
        assert!(h.get("content-type").is_some());
    }

    #[test]
    fn test_new_strips_and_detects() {
        let url = Url::parse("https://app.test/").unwrap();
        let req = FetchRequest::new(
            Method::GET,
            url,
            headers(&[("sec-fetch-mode", "navigate"), ("te", "trailers")]),
            Bytes::new(),
        );
        assert!(req.navigation);
        assert!(req.headers.get("te").is_none());
    }
}
