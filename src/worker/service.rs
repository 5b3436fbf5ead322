//! Service Worker Module
//!
//! The offline cache manager: install seeds a new generation with the shell
//! assets, activate promotes it and deletes every other generation, and
//! fetch answers intercepted requests network-first with cache fallback.

use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{
    CacheStats, CacheStorage, Generation, RequestKey, ResponseSnapshot, StatsSnapshot,
};
use crate::config::Config;
use crate::error::WorkerError;
use crate::tasks::spawn_cache_write;
use crate::worker::{FetchRequest, Upstream};

// == Worker Config ==
/// Resolved worker settings.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Origin the shell is served from
    pub origin: Url,
    /// Generation tag installed at startup
    pub version: String,
    /// Absolute URLs of the shell assets
    pub shell_assets: Vec<Url>,
    /// Hosts that always go to the network untouched
    pub excluded_hosts: Vec<String>,
    /// Absolute URL of the offline fallback document
    pub offline_fallback: Url,
}

impl WorkerConfig {
    /// Resolves asset and fallback paths against the origin.
    ///
    /// The offline fallback is always part of the seeded set, appended when
    /// the asset list does not already name it.
    pub fn new(
        origin: &str,
        version: impl Into<String>,
        shell_assets: &[String],
        excluded_hosts: &[String],
        offline_fallback: &str,
    ) -> Result<Self, WorkerError> {
        let origin = Url::parse(origin)
            .map_err(|e| WorkerError::InvalidRequest(format!("origin '{}': {}", origin, e)))?;
        let resolve = |path: &str| {
            origin
                .join(path)
                .map_err(|e| WorkerError::InvalidRequest(format!("path '{}': {}", path, e)))
        };

        let mut shell_assets = shell_assets
            .iter()
            .map(|path| resolve(path))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_fallback = resolve(offline_fallback)?;
        if !shell_assets.contains(&offline_fallback) {
            shell_assets.push(offline_fallback.clone());
        }

        Ok(Self {
            version: version.into(),
            shell_assets,
            excluded_hosts: excluded_hosts
                .iter()
                .map(|h| h.trim().to_ascii_lowercase())
                .collect(),
            offline_fallback,
            origin,
        })
    }

    /// Builds worker settings from the server configuration.
    pub fn from_config(config: &Config) -> Result<Self, WorkerError> {
        Self::new(
            &config.upstream_origin,
            config.cache_version.clone(),
            &config.shell_assets,
            &config.excluded_hosts,
            &config.offline_fallback,
        )
    }

    /// Resolves a request path and query against the origin.
    pub fn resolve(&self, path_and_query: &str) -> Result<Url, WorkerError> {
        self.origin
            .join(path_and_query)
            .map_err(|e| WorkerError::InvalidRequest(format!("{}: {}", path_and_query, e)))
    }

    /// Returns true if the URL's host is, or is a subdomain of, an excluded host.
    pub fn is_excluded(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        self.excluded_hosts.iter().any(|excluded| {
            host == *excluded
                || host
                    .strip_suffix(excluded.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

// == Worker State ==
/// Lifecycle state of the most recently installed worker version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Nothing installed yet
    #[default]
    Parsed,
    /// Seeding a new generation
    Installing,
    /// A generation is installed and waiting to take over
    Waiting,
    /// The current generation is serving traffic
    Active,
}

#[derive(Debug, Default)]
struct Slots {
    state: WorkerState,
    active: Option<String>,
    waiting: Option<String>,
}

/// Snapshot of the worker for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStatus {
    pub state: WorkerState,
    pub active: Option<String>,
    pub waiting: Option<String>,
    /// Every generation tag present in storage
    pub generations: Vec<String>,
    /// Entries in the active generation
    pub entries: usize,
    pub stats: StatsSnapshot,
    /// Share of intercepted requests answered without the network
    pub offline_rate: f64,
}

// == Fetch Outcome ==
/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchSource {
    /// Live response from the network
    Network,
    /// Stored snapshot served while the network was down
    Cache,
    /// Offline document served in place of a navigation
    OfflineFallback,
    /// Request bypassed the cache entirely
    Passthrough,
}

impl FetchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSource::Network => "network",
            FetchSource::Cache => "cache",
            FetchSource::OfflineFallback => "offline-fallback",
            FetchSource::Passthrough => "passthrough",
        }
    }
}

/// Answer to an intercepted request.
#[derive(Debug)]
pub struct FetchOutcome {
    pub response: ResponseSnapshot,
    pub source: FetchSource,
    /// Background store of a fresh response, if one was started
    pub cache_write: Option<JoinHandle<()>>,
}

impl FetchOutcome {
    fn new(response: ResponseSnapshot, source: FetchSource) -> Self {
        Self {
            response,
            source,
            cache_write: None,
        }
    }
}

// == Service Worker ==
/// Offline cache manager in front of the shell origin.
pub struct ServiceWorker {
    config: WorkerConfig,
    upstream: Arc<dyn Upstream>,
    storage: Arc<CacheStorage>,
    stats: Arc<CacheStats>,
    /// Serializes install and activate
    lifecycle: Mutex<()>,
    slots: RwLock<Slots>,
}

impl ServiceWorker {
    // == Constructor ==
    pub fn new(config: WorkerConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config,
            upstream,
            storage: Arc::new(CacheStorage::new()),
            stats: Arc::new(CacheStats::new()),
            lifecycle: Mutex::new(()),
            slots: RwLock::new(Slots::default()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<CacheStorage> {
        &self.storage
    }

    /// Tag of the generation currently serving traffic.
    pub async fn active_generation(&self) -> Option<String> {
        self.slots.read().await.active.clone()
    }

    // == Install ==
    /// Seeds a new generation tagged `version` with every shell asset.
    ///
    /// Seeding is all-or-nothing: if any asset fails to fetch or is not a 200,
    /// nothing is stored and the previous state stays authoritative.
    pub async fn install(&self, version: &str) -> Result<(), WorkerError> {
        let _guard = self.lifecycle.lock().await;

        let previous = {
            let mut slots = self.slots.write().await;
            std::mem::replace(&mut slots.state, WorkerState::Installing)
        };
        info!(
            "Installing generation {} ({} shell assets)",
            version,
            self.config.shell_assets.len()
        );

        match self.seed().await {
            Ok(generation) => {
                self.storage.put_generation(version, generation).await;
                let mut slots = self.slots.write().await;
                slots.waiting = Some(version.to_string());
                slots.state = WorkerState::Waiting;
                info!("Generation {} installed and waiting", version);
                Ok(())
            }
            Err(err) => {
                self.slots.write().await.state = previous;
                warn!("Install of generation {} aborted: {}", version, err);
                Err(err)
            }
        }
    }

    async fn seed(&self) -> Result<Generation, WorkerError> {
        let mut generation = Generation::new();

        for url in &self.config.shell_assets {
            let request = FetchRequest::get(url.clone());
            let response =
                self.upstream
                    .fetch(&request)
                    .await
                    .map_err(|e| WorkerError::InstallFailed {
                        asset: url.to_string(),
                        reason: e.to_string(),
                    })?;

            if !response.is_cacheable() {
                return Err(WorkerError::InstallFailed {
                    asset: url.to_string(),
                    reason: format!("status {}", response.status),
                });
            }
            generation.insert(request.key(), response);
        }

        Ok(generation)
    }

    // == Activate ==
    /// Promotes the waiting generation and deletes every other one.
    ///
    /// Fetch handlers read the active tag under the same lock, so no request
    /// sees the new generation before cleanup finishes.
    pub async fn activate(&self) -> Result<String, WorkerError> {
        let _guard = self.lifecycle.lock().await;
        let mut slots = self.slots.write().await;

        let tag = slots
            .waiting
            .take()
            .ok_or(WorkerError::NothingToActivate)?;

        for old in self.storage.tags().await {
            if old != tag {
                self.storage.delete(&old).await;
                info!("Deleted superseded generation {}", old);
            }
        }

        slots.active = Some(tag.clone());
        slots.state = WorkerState::Active;
        info!("Generation {} is now active", tag);
        Ok(tag)
    }

    // == Update ==
    /// Installs `version` and immediately activates it.
    pub async fn update(&self, version: &str) -> Result<String, WorkerError> {
        self.install(version).await?;
        self.activate().await
    }

    // == Fetch ==
    /// Answers an intercepted request.
    ///
    /// Non-GET requests and requests to excluded hosts go straight to the
    /// network. Everything else is tried on the network first; a 200 is copied
    /// into the active generation in the background. When the network fails,
    /// the stored copy is served, then the offline document for navigations.
    pub async fn handle_fetch(&self, request: FetchRequest) -> Result<FetchOutcome, WorkerError> {
        if request.method != Method::GET || self.config.is_excluded(&request.url) {
            self.stats.record_passthrough();
            let response = self.upstream.fetch(&request).await?;
            return Ok(FetchOutcome::new(response, FetchSource::Passthrough));
        }

        let key = request.key();
        match self.upstream.fetch(&request).await {
            Ok(response) => {
                self.stats.record_network();
                let mut outcome = FetchOutcome::new(response, FetchSource::Network);
                if outcome.response.is_cacheable() {
                    if let Some(tag) = self.active_generation().await {
                        outcome.cache_write = Some(spawn_cache_write(
                            self.storage.clone(),
                            self.stats.clone(),
                            tag,
                            key,
                            outcome.response.clone(),
                        ));
                    }
                }
                Ok(outcome)
            }
            Err(err) => {
                debug!("Network failed for {}: {}", key, err);
                self.serve_offline(&request, &key).await
            }
        }
    }

    async fn serve_offline(
        &self,
        request: &FetchRequest,
        key: &RequestKey,
    ) -> Result<FetchOutcome, WorkerError> {
        if let Some(tag) = self.active_generation().await {
            if let Some(hit) = self.storage.lookup(&tag, key).await {
                self.stats.record_cache_hit();
                return Ok(FetchOutcome::new(hit, FetchSource::Cache));
            }

            if request.navigation {
                let fallback = RequestKey::get(&self.config.offline_fallback);
                if let Some(document) = self.storage.lookup(&tag, &fallback).await {
                    self.stats.record_offline_fallback();
                    return Ok(FetchOutcome::new(document, FetchSource::OfflineFallback));
                }
            }
        }

        self.stats.record_miss();
        Err(WorkerError::Unavailable(request.url.to_string()))
    }

    // == Status ==
    pub async fn status(&self) -> WorkerStatus {
        let (state, active, waiting) = {
            let slots = self.slots.read().await;
            (slots.state, slots.active.clone(), slots.waiting.clone())
        };
        let entries = match &active {
            Some(tag) => self.storage.len(tag).await,
            None => 0,
        };
        let stats = self.stats.snapshot();

        WorkerStatus {
            state,
            active,
            waiting,
            generations: self.storage.tags().await,
            entries,
            offline_rate: stats.offline_rate(),
            stats,
        }
    }
}
