//! Shell Vault - An offline-first caching proxy with a JSON backup gateway
//!
//! Keeps a versioned cache of an application shell so pages keep loading
//! when the origin is unreachable, and stores one JSON backup per identifier.

pub mod api;
pub mod backup;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod worker;

pub use api::AppState;
pub use config::Config;
pub use worker::ServiceWorker;
