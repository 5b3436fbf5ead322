//! Cache Store Module
//!
//! Named generations of cached responses. Each generation is a complete,
//! versioned namespace; the worker decides which one is current.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::cache::{RequestKey, ResponseSnapshot};

// == Generation ==
/// One versioned set of cached responses.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    entries: HashMap<RequestKey, ResponseSnapshot>,
}

impl Generation {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a snapshot, replacing any previous one under the same key.
    pub fn insert(&mut self, key: RequestKey, snapshot: ResponseSnapshot) {
        self.entries.insert(key, snapshot);
    }

    pub fn get(&self, key: &RequestKey) -> Option<&ResponseSnapshot> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &RequestKey> {
        self.entries.keys()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

// == Cache Storage ==
/// All generations held by the worker, keyed by generation tag.
///
/// Reads and inserts may run concurrently from many fetch handlers.
#[derive(Debug, Default)]
pub struct CacheStorage {
    generations: RwLock<HashMap<String, Generation>>,
}

impl CacheStorage {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Put Generation ==
    /// Stores a fully populated generation, replacing any generation with the same tag.
    pub async fn put_generation(&self, tag: &str, generation: Generation) {
        self.generations
            .write()
            .await
            .insert(tag.to_string(), generation);
    }

    // == Put ==
    /// Stores one snapshot in an existing generation.
    ///
    /// Returns false when the generation no longer exists, which happens when
    /// it was superseded while the write was in flight.
    pub async fn put(&self, tag: &str, key: RequestKey, snapshot: ResponseSnapshot) -> bool {
        match self.generations.write().await.get_mut(tag) {
            Some(generation) => {
                generation.insert(key, snapshot);
                true
            }
            None => false,
        }
    }

    // == Lookup ==
    /// Returns the snapshot stored under `key` in generation `tag`.
    pub async fn lookup(&self, tag: &str, key: &RequestKey) -> Option<ResponseSnapshot> {
        self.generations
            .read()
            .await
            .get(tag)
            .and_then(|generation| generation.get(key))
            .cloned()
    }

    // == Tags ==
    /// Lists every generation tag currently held, sorted.
    pub async fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.generations.read().await.keys().cloned().collect();
        tags.sort();
        tags
    }

    // == Delete ==
    /// Removes a whole generation. Returns true if it existed.
    pub async fn delete(&self, tag: &str) -> bool {
        self.generations.write().await.remove(tag).is_some()
    }

    // == Keys ==
    /// Lists the request keys stored in a generation.
    pub async fn keys(&self, tag: &str) -> Vec<RequestKey> {
        self.generations
            .read()
            .await
            .get(tag)
            .map(|generation| generation.keys().cloned().collect())
            .unwrap_or_default()
    }

    // == Length ==
    /// Returns the number of entries in a generation (0 if absent).
    pub async fn len(&self, tag: &str) -> usize {
        self.generations
            .read()
            .await
            .get(tag)
            .map(Generation::len)
            .unwrap_or(0)
    }

    pub async fn contains(&self, tag: &str) -> bool {
        self.generations.read().await.contains_key(tag)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use url::Url;

    fn key(path: &str) -> RequestKey {
        RequestKey::get(&Url::parse("https://app.test").unwrap().join(path).unwrap())
    }

    fn snapshot(body: &'static str) -> ResponseSnapshot {
        ResponseSnapshot::new(StatusCode::OK, HeaderMap::new(), body)
    }

    #[tokio::test]
    async fn test_storage_new_is_empty() {
        let storage = CacheStorage::new();
        assert!(storage.tags().await.is_empty());
        assert_eq!(storage.len("v1").await, 0);
    }

    #[tokio::test]
    async fn test_put_requires_existing_generation() {
        let storage = CacheStorage::new();
        assert!(!storage.put("v1", key("/a"), snapshot("a")).await);

        storage.put_generation("v1", Generation::new()).await;
        assert!(storage.put("v1", key("/a"), snapshot("a")).await);
        assert_eq!(storage.len("v1").await, 1);
    }

    #[tokio::test]
    async fn test_lookup_and_overwrite() {
        let storage = CacheStorage::new();
        storage.put_generation("v1", Generation::new()).await;

        storage.put("v1", key("/a"), snapshot("old")).await;
        storage.put("v1", key("/a"), snapshot("new")).await;

        let found = storage.lookup("v1", &key("/a")).await.unwrap();
        assert_eq!(found.body, "new");
        assert_eq!(storage.len("v1").await, 1);
    }

    #[tokio::test]
    async fn test_generations_are_isolated() {
        let storage = CacheStorage::new();
        storage.put_generation("v1", Generation::new()).await;
        storage.put_generation("v2", Generation::new()).await;

        storage.put("v1", key("/a"), snapshot("a")).await;

        assert!(storage.lookup("v1", &key("/a")).await.is_some());
        assert!(storage.lookup("v2", &key("/a")).await.is_none());
    }

    #[tokio::test]
    async fn test_delete_generation() {
        let storage = CacheStorage::new();
        let mut generation = Generation::new();
        generation.insert(key("/a"), snapshot("a"));
        storage.put_generation("v1", generation).await;

        assert!(storage.delete("v1").await);
        assert!(!storage.delete("v1").await);
        assert!(storage.lookup("v1", &key("/a")).await.is_none());
        assert!(!storage.contains("v1").await);
    }

    #[tokio::test]
    async fn test_put_generation_replaces_whole_set() {
        let storage = CacheStorage::new();
        let mut first = Generation::new();
        first.insert(key("/a"), snapshot("a"));
        first.insert(key("/b"), snapshot("b"));
        storage.put_generation("v1", first).await;

        let mut second = Generation::new();
        second.insert(key("/c"), snapshot("c"));
        storage.put_generation("v1", second).await;

        assert_eq!(storage.keys("v1").await, vec![key("/c")]);
    }
}
