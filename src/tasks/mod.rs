//! Background Tasks Module
//!
//! Contains detached tasks spawned by the worker.
//!
//! # Tasks
//! - Cache write: stores a fresh network response in the current generation

mod cache_write;

pub use cache_write::spawn_cache_write;
