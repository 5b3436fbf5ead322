//! API Module
//!
//! HTTP handlers and routing for the shell vault server.
//!
//! # Endpoints
//! - `POST /api/backup?backupId=` - Store a backup document
//! - `GET /api/backup?backupId=` - Retrieve a backup document
//! - `GET /health` - Health check endpoint
//! - `GET /sw/status` - Worker status
//! - `POST /sw/update` - Install and activate a cache generation
//! - fallback - Offline-first proxy to the shell origin

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
