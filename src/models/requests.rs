//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

/// Query string of the backup endpoint (`/api/backup?backupId=...`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupQuery {
    /// Caller-supplied backup identifier
    #[serde(rename = "backupId", default)]
    pub backup_id: Option<String>,
}

/// Request body for POST /sw/update
///
/// # Fields
/// - `version`: Tag of the cache generation to install and activate
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRequest {
    pub version: String,
}

impl UpdateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        let version = self.version.trim();
        if version.is_empty() {
            return Some("Version cannot be empty".to_string());
        }
        if version.len() > 64 {
            return Some("Version exceeds maximum length of 64 characters".to_string());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_query_deserialize() {
        let query: BackupQuery = serde_json::from_str(r#"{"backupId": "abc"}"#).unwrap();
        assert_eq!(query.backup_id.as_deref(), Some("abc"));

        let query: BackupQuery = serde_json::from_str("{}").unwrap();
        assert!(query.backup_id.is_none());
    }

    #[test]
    fn test_update_request_deserialize() {
        let req: UpdateRequest = serde_json::from_str(r#"{"version": "v2"}"#).unwrap();
        assert_eq!(req.version, "v2");
    }

    #[test]
    fn test_validate_empty_version() {
        let req = UpdateRequest {
            version: "  ".to_string(),
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = UpdateRequest {
            version: "lifeos-v2".to_string(),
        };
        assert!(req.validate().is_none());
    }
}
