//! Blob Store Module
//!
//! The object store seam behind the backup gateway.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::RwLock;

use crate::error::StoreError;

/// A durable object store addressed by path.
///
/// `get` must report a missing object as [`StoreError::NotFound`] so callers
/// can tell "never written" apart from a failing backend. `put` replaces the
/// object unconditionally and must never leave a partial object behind.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn get(&self, path: &str) -> Result<Bytes, StoreError>;

    async fn put(&self, path: &str, data: Bytes) -> Result<(), StoreError>;
}

// == Memory Blob Store ==
/// In-process [`BlobStore`]. Counts every call so tests can assert on access.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, Bytes>>,
    calls: AtomicU64,
}

impl MemoryBlobStore {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get` and `put` calls made so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, path: &str) -> Result<Bytes, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn put(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.objects.write().await.insert(path.to_string(), data);
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryBlobStore::new();
        store
            .put("backups/a.json", Bytes::from_static(b"{\"a\":1}"))
            .await
            .unwrap();

        let data = store.get("backups/a.json").await.unwrap();
        assert_eq!(data, Bytes::from_static(b"{\"a\":1}"));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_memory_store_missing_is_not_found() {
        let store = MemoryBlobStore::new();
        let result = store.get("backups/none.json").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_store_overwrites() {
        let store = MemoryBlobStore::new();
        store.put("k", Bytes::from_static(b"1")).await.unwrap();
        store.put("k", Bytes::from_static(b"2")).await.unwrap();

        assert_eq!(store.get("k").await.unwrap(), Bytes::from_static(b"2"));
        assert_eq!(store.len().await, 1);
    }
}
