//! Backup Gateway
//!
//! Read and write of one JSON document per backup identifier. The identifier
//! is the only capability guarding a backup, so it is validated for presence
//! before the store is touched.

use std::sync::Arc;

use axum::body::Bytes;
use serde_json::Value;
use tracing::{error, info};

use crate::backup::BlobStore;
use crate::error::{GatewayError, Result};

/// Object path of the backup stored under `id`.
pub fn backup_path(id: &str) -> String {
    format!("backups/{}.json", id)
}

/// Checks that a backup identifier is present and stays inside `backups/`.
pub fn validate_backup_id(id: Option<&str>) -> Result<&str> {
    let id = match id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(GatewayError::MissingId),
    };
    if id.contains(['/', '\\']) || id == "." || id == ".." {
        return Err(GatewayError::InvalidId);
    }
    Ok(id)
}

// == Backup Gateway ==
/// Mediates every access to backup documents.
#[derive(Clone)]
pub struct BackupGateway {
    store: Arc<dyn BlobStore>,
}

impl BackupGateway {
    // == Constructor ==
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    // == Write ==
    /// Parses `body` as JSON and replaces the document stored under `id`.
    ///
    /// The document is stored in compact form with object keys in the order
    /// they were written. A body that is not JSON is reported as a generic
    /// internal error, same as a store failure.
    pub async fn write(&self, id: Option<&str>, body: &[u8]) -> Result<()> {
        let id = validate_backup_id(id)?;

        let document: Value = serde_json::from_slice(body).map_err(|e| {
            error!("Backup {} body is not valid JSON: {}", id, e);
            GatewayError::Internal(e.to_string())
        })?;
        let data = serde_json::to_vec(&document)
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        let path = backup_path(id);
        self.store.put(&path, Bytes::from(data)).await.map_err(|e| {
            error!("Failed to store backup {}: {}", id, e);
            GatewayError::from(e)
        })?;

        info!("Stored backup {}", path);
        Ok(())
    }

    // == Read ==
    /// Returns the document stored under `id` exactly as written.
    pub async fn read(&self, id: Option<&str>) -> Result<Bytes> {
        let id = validate_backup_id(id)?;
        let path = backup_path(id);

        self.store.get(&path).await.map_err(|e| {
            let err = GatewayError::from(e);
            if let GatewayError::Internal(msg) = &err {
                error!("Failed to read backup {}: {}", id, msg);
            }
            err
        })
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::MemoryBlobStore;
    use crate::error::StoreError;
    use async_trait::async_trait;

    /// Store whose backend is always down.
    struct BrokenStore;

    #[async_trait]
    impl BlobStore for BrokenStore {
        async fn get(&self, _path: &str) -> std::result::Result<Bytes, StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }

        async fn put(&self, _path: &str, _data: Bytes) -> std::result::Result<(), StoreError> {
            Err(StoreError::Backend("connection reset".to_string()))
        }
    }

    fn gateway() -> (BackupGateway, Arc<MemoryBlobStore>) {
        let store = Arc::new(MemoryBlobStore::new());
        (BackupGateway::new(store.clone()), store)
    }

    #[test]
    fn test_backup_path() {
        assert_eq!(backup_path("abc123"), "backups/abc123.json");
    }

    #[test]
    fn test_validate_backup_id() {
        assert!(matches!(validate_backup_id(None), Err(GatewayError::MissingId)));
        assert!(matches!(validate_backup_id(Some("")), Err(GatewayError::MissingId)));
        assert!(matches!(
            validate_backup_id(Some("../etc")),
            Err(GatewayError::InvalidId)
        ));
        assert!(matches!(validate_backup_id(Some("..")), Err(GatewayError::InvalidId)));
        assert_eq!(validate_backup_id(Some("u-42")).unwrap(), "u-42");
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let (gateway, _store) = gateway();
        gateway.write(Some("X"), br#"{"a":1}"#).await.unwrap();

        let data = gateway.read(Some("X")).await.unwrap();
        assert_eq!(data, Bytes::from_static(br#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_write_keeps_key_order() {
        let (gateway, _store) = gateway();
        gateway.write(Some("X"), br#"{"b":1,"a":2}"#).await.unwrap();
        assert_eq!(
            gateway.read(Some("X")).await.unwrap(),
            Bytes::from_static(br#"{"b":1,"a":2}"#)
        );

        gateway
            .write(Some("Y"), br#"{ "z": {"y": 1, "x": [2, 1]}, "a": null }"#)
            .await
            .unwrap();
        assert_eq!(
            gateway.read(Some("Y")).await.unwrap(),
            Bytes::from_static(br#"{"z":{"y":1,"x":[2,1]},"a":null}"#)
        );
    }

    #[tokio::test]
    async fn test_write_replaces_previous_document() {
        let (gateway, store) = gateway();
        gateway.write(Some("X"), br#"{"a":1}"#).await.unwrap();
        gateway.write(Some("X"), br#"{"b":2}"#).await.unwrap();

        let data = gateway.read(Some("X")).await.unwrap();
        assert_eq!(data, Bytes::from_static(br#"{"b":2}"#));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_read_never_written_is_not_found() {
        let (gateway, _store) = gateway();
        assert!(matches!(
            gateway.read(Some("missing")).await,
            Err(GatewayError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_missing_id_does_not_touch_store() {
        let (gateway, store) = gateway();

        assert!(matches!(
            gateway.write(None, br#"{"a":1}"#).await,
            Err(GatewayError::MissingId)
        ));
        assert!(matches!(
            gateway.read(Some("")).await,
            Err(GatewayError::MissingId)
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_json_is_internal_and_not_stored() {
        let (gateway, store) = gateway();

        let result = gateway.write(Some("X"), b"not json").await;
        assert!(matches!(result, Err(GatewayError::Internal(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_is_internal() {
        let gateway = BackupGateway::new(Arc::new(BrokenStore));

        assert!(matches!(
            gateway.read(Some("X")).await,
            Err(GatewayError::Internal(_))
        ));
        assert!(matches!(
            gateway.write(Some("X"), b"{}").await,
            Err(GatewayError::Internal(_))
        ));
    }
}
