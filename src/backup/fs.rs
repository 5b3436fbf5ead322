//! Filesystem Blob Store
//!
//! Stores each object as a file under a root directory. Writes go to a
//! temporary sibling first and are renamed into place, so readers see either
//! the old document or the new one.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use axum::body::Bytes;
use tracing::debug;

use crate::backup::BlobStore;
use crate::error::StoreError;

/// [`BlobStore`] rooted at a local directory.
#[derive(Debug)]
pub struct FsBlobStore {
    root: PathBuf,
    /// Distinguishes temp files of concurrent writes to the same object
    sequence: AtomicU64,
}

impl FsBlobStore {
    // == Constructor ==
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sequence: AtomicU64::new(0),
        }
    }

    fn object_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(path);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if !is_plain || path.is_empty() {
            return Err(StoreError::Backend(format!("invalid object path '{}'", path)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get(&self, path: &str) -> Result<Bytes, StoreError> {
        let full = self.object_path(path)?;
        match tokio::fs::read(&full).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn put(&self, path: &str, data: Bytes) -> Result<(), StoreError> {
        let full = self.object_path(path)?;
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let mut temp = full.clone().into_os_string();
        temp.push(format!(".{}.{}.tmp", std::process::id(), sequence));
        let temp = PathBuf::from(temp);

        if let Err(err) = tokio::fs::write(&temp, &data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err.into());
        }
        if let Err(err) = tokio::fs::rename(&temp, &full).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(err.into());
        }

        debug!("Wrote {} bytes to {}", data.len(), full.display());
        Ok(())
    }
}
