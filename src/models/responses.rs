//! Response DTOs for the HTTP API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for a successful backup write (POST /api/backup)
#[derive(Debug, Clone, Serialize)]
pub struct BackupSavedResponse {
    /// Confirmation message
    pub message: String,
}

impl BackupSavedResponse {
    pub fn new() -> Self {
        Self {
            message: "Backup saved successfully".to_string(),
        }
    }
}

impl Default for BackupSavedResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Active cache generation, if any
    pub generation: Option<String>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(generation: Option<String>) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            generation,
        }
    }
}
