//! Key-value cache seam with TTL and delete-by-key.
//!
//! The cache is an optional capability: wiring in `NoopCache` means every
//! read misses and the pipeline recomputes. Callers never treat a cache
//! outage as an error.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get(&self, key: &str) -> Option<serde_json::Value>;
    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration);
    async fn delete(&self, key: &str);
}

/// Typed read. Deserialization failures count as misses.
pub async fn cache_get<T: DeserializeOwned>(cache: &dyn Cache, key: &str) -> Option<T> {
    let value = cache.get(key).await?;
    serde_json::from_value(value).ok()
}

/// Typed write. Unserializable values are silently dropped.
pub async fn cache_set<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    if let Ok(value) = serde_json::to_value(value) {
        cache.set(key, value, ttl).await;
    }
}

/// In-process cache with lazy expiry. Entries past their deadline are
/// dropped on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (serde_json::Value, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, deadline)) if Instant::now() < *deadline => {
                    return Some(value.clone())
                }
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.entries.write().await.remove(key);
        }
        None
    }

    async fn set(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value, deadline));
    }

    async fn delete(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

/// Always-miss cache for deployments without a cache backend.
#[derive(Default)]
pub struct NoopCache;

impl NoopCache {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Cache for NoopCache {
    async fn get(&self, _key: &str) -> Option<serde_json::Value> {
        None
    }

    async fn set(&self, _key: &str, _value: serde_json::Value, _ttl: Duration) {}

    async fn delete(&self, _key: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_cache_round_trips_typed_values() {
        let cache = MemoryCache::new();
        cache_set(&cache, "k", &vec![1.0f32, 2.0], Duration::from_secs(60)).await;
        let got: Option<Vec<f32>> = cache_get(&cache, "k").await;
        assert_eq!(got, Some(vec![1.0, 2.0]));
    }

    #[tokio::test]
    async fn memory_cache_expires_entries() {
        let cache = MemoryCache::new();
        cache_set(&cache, "k", &1u32, Duration::from_millis(1)).await;
        tokio::time::sleep(Duration::from_millis(10)).await;
        let got: Option<u32> = cache_get(&cache, "k").await;
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn delete_removes_entry() {
        let cache = MemoryCache::new();
        cache_set(&cache, "k", &1u32, Duration::from_secs(60)).await;
        cache.delete("k").await;
        let got: Option<u32> = cache_get(&cache, "k").await;
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn noop_cache_always_misses() {
        let cache = NoopCache::new();
        cache_set(&cache, "k", &1u32, Duration::from_secs(60)).await;
        let got: Option<u32> = cache_get(&cache, "k").await;
        assert_eq!(got, None);
    }
}
