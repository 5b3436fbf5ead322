//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;

/// Default shell assets seeded into every cache generation.
pub const DEFAULT_SHELL_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/styles.css",
    "/app.js",
    "/icon-192.png",
    "/manifest.json",
];

/// Default hosts that always bypass the cache (auth, database and CDN providers).
pub const DEFAULT_EXCLUDED_HOSTS: &[&str] = &[
    "firebaseapp.com",
    "firebaseio.com",
    "googleapis.com",
    "gstatic.com",
    "cdnjs.cloudflare.com",
];

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Origin serving the application shell, e.g. `http://127.0.0.1:8080`
    pub upstream_origin: String,
    /// Generation tag for the cache installed at startup
    pub cache_version: String,
    /// Paths (relative to the origin) seeded on install
    pub shell_assets: Vec<String>,
    /// Hosts whose requests are never cached
    pub excluded_hosts: Vec<String>,
    /// Path of the document served to navigations when offline
    pub offline_fallback: String,
    /// Directory for the durable backup store; in-memory when None
    pub backup_dir: Option<PathBuf>,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_ORIGIN` - Shell origin (default: http://127.0.0.1:8080)
    /// - `CACHE_VERSION` - Generation tag (default: lifeos-v1)
    /// - `SHELL_ASSETS` - Comma-separated asset paths
    /// - `EXCLUDED_HOSTS` - Comma-separated host names
    /// - `OFFLINE_FALLBACK` - Offline document path (default: /index.html)
    /// - `BACKUP_DIR` - Backup store directory (default: unset, in-memory)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
            upstream_origin: env::var("UPSTREAM_ORIGIN").unwrap_or(defaults.upstream_origin),
            cache_version: env::var("CACHE_VERSION")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.cache_version),
            shell_assets: env::var("SHELL_ASSETS")
                .ok()
                .map(|v| split_list(&v))
                .filter(|list| !list.is_empty())
                .unwrap_or(defaults.shell_assets),
            excluded_hosts: env::var("EXCLUDED_HOSTS")
                .ok()
                .map(|v| split_list(&v))
                .unwrap_or(defaults.excluded_hosts),
            offline_fallback: env::var("OFFLINE_FALLBACK").unwrap_or(defaults.offline_fallback),
            backup_dir: env::var("BACKUP_DIR")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            upstream_timeout: env::var("UPSTREAM_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.upstream_timeout),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            upstream_origin: "http://127.0.0.1:8080".to_string(),
            cache_version: "lifeos-v1".to_string(),
            shell_assets: DEFAULT_SHELL_ASSETS.iter().map(|s| s.to_string()).collect(),
            excluded_hosts: DEFAULT_EXCLUDED_HOSTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            offline_fallback: "/index.html".to_string(),
            backup_dir: None,
            upstream_timeout: 30,
        }
    }
}

/// Splits a comma-separated list, trimming and dropping empty items.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
