//! Cache Write Task
//!
//! Stores a copy of a live response after it has been handed to the caller.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheStats, CacheStorage, RequestKey, ResponseSnapshot};

/// Spawns a best-effort write of `snapshot` into generation `tag`.
///
/// The task never reports failure to the request that produced the response;
/// a dropped write only shows up in the logs and the `store_failures` counter.
///
/// # Returns
/// A JoinHandle for the spawned task. Callers that do not care when the
/// write lands can drop it; the task keeps running.
///
/// # Example
/// ```ignore
/// let handle = spawn_cache_write(storage.clone(), stats.clone(), "v1".into(), key, snapshot);
/// handle.await.ok();
/// ```
pub fn spawn_cache_write(
    storage: Arc<CacheStorage>,
    stats: Arc<CacheStats>,
    tag: String,
    key: RequestKey,
    snapshot: ResponseSnapshot,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let label = key.to_string();
        if storage.put(&tag, key, snapshot).await {
            stats.record_store_write();
            debug!("Cached {} in generation {}", label, tag);
        } else {
            stats.record_store_failure();
            warn!(
                "Dropped cache write for {}: generation {} no longer exists",
                label, tag
            );
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Generation;
    use axum::http::{HeaderMap, StatusCode};
    use url::Url;

    fn key() -> RequestKey {
        RequestKey::get(&Url::parse("https://app.test/page").unwrap())
    }

    #[tokio::test]
    async fn test_cache_write_stores_snapshot() {
        let storage = Arc::new(CacheStorage::new());
        let stats = Arc::new(CacheStats::new());
        storage.put_generation("v1", Generation::new()).await;

        let snapshot = ResponseSnapshot::new(StatusCode::OK, HeaderMap::new(), "hello");
        spawn_cache_write(storage.clone(), stats.clone(), "v1".to_string(), key(), snapshot)
            .await
            .unwrap();

        let stored = storage.lookup("v1", &key()).await.unwrap();
        assert_eq!(stored.body, "hello");
        assert_eq!(stats.snapshot().store_writes, 1);
    }

    #[tokio::test]
    async fn test_cache_write_to_missing_generation_is_swallowed() {
        let storage = Arc::new(CacheStorage::new());
        let stats = Arc::new(CacheStats::new());

        let snapshot = ResponseSnapshot::new(StatusCode::OK, HeaderMap::new(), "hello");
        let result =
            spawn_cache_write(storage.clone(), stats.clone(), "gone".to_string(), key(), snapshot)
                .await;

        assert!(result.is_ok(), "Task must not panic on a dropped write");
        assert!(storage.tags().await.is_empty());
        assert_eq!(stats.snapshot().store_failures, 1);
    }
}
