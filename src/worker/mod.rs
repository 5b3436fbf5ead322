//! Worker Module
//!
//! Offline-first request handling in front of the application shell.
//!
//! # Lifecycle
//! - Install: seed a new cache generation with the shell assets
//! - Activate: promote it and delete every other generation
//! - Fetch: network first, falling back to the cache, then the offline page

mod fake;
mod request;
mod service;
mod upstream;


pub use fake::FakeUpstream;
pub use request::{is_navigation, strip_hop_by_hop, FetchRequest};
pub use service::{
    FetchOutcome, FetchSource, ServiceWorker, WorkerConfig, WorkerState, WorkerStatus,
};
pub use upstream::{HttpUpstream, Upstream};
