//! Typed cache service applying the namespace TTL policy

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::key::{CacheKey, Namespace};
use crate::metrics::{CacheMetrics, CacheStats};
use crate::storage::{CacheEntry, CacheStorage, MemoryStorage};

/// Cache client used by the search pipeline.
///
/// Backend failures never propagate: a failed read is a miss, a failed
/// write is dropped. Both are counted and logged.
#[derive(Clone)]
pub struct CacheService {
    storage: Arc<dyn CacheStorage>,
    metrics: CacheMetrics,
}

impl CacheService {
    pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            storage,
            metrics: CacheMetrics::new(),
        }
    }

    /// Service backed by in-process memory, for tests and development
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot()
    }

    /// Read a value; expired entries and backend errors read as misses
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let raw = match self.storage.get(key.as_str()).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "cache read failed, treating as miss");
                self.metrics.record_backend_error();
                self.metrics.record_miss();
                return None;
            }
        };

        let Some(value) = raw else {
            debug!(key = %key, "cache miss");
            self.metrics.record_miss();
            return None;
        };

        let entry: CacheEntry<T> = match serde_json::from_value(value) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "cache entry undecodable, treating as miss");
                let _ = self.storage.remove(key.as_str()).await;
                self.metrics.record_miss();
                return None;
            }
        };

        if entry.is_expired() {
            debug!(key = %key, "cache entry expired");
            let _ = self.storage.remove(key.as_str()).await;
            self.metrics.record_miss();
            return None;
        }

        debug!(key = %key, "cache hit");
        self.metrics.record_hit();
        Some(entry.data)
    }

    /// Write a value under the namespace TTL. Fire-and-forget: failures are
    /// logged and dropped.
    pub async fn set<T: Serialize>(&self, key: &CacheKey, value: &T) {
        self.set_with_ttl(key, value, key.namespace().ttl()).await;
    }

    /// Write a value with an explicit TTL (documented overrides only, e.g.
    /// the short TTL for degraded search results)
    pub async fn set_with_ttl<T: Serialize>(&self, key: &CacheKey, value: &T, ttl: Duration) {
        let entry = CacheEntry::new(value, ttl);
        let json = match serde_json::to_value(&entry) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "cache value not serializable, dropping write");
                return;
            }
        };
        match self.storage.set(key.as_str(), &json).await {
            Ok(()) => self.metrics.record_store(),
            Err(e) => {
                warn!(key = %key, error = %e, "cache write failed, dropping");
                self.metrics.record_backend_error();
            }
        }
    }

    /// Run `compute` through the cache: return the cached value when
    /// present, otherwise compute, store and return.
    ///
    /// This is the explicit call-site equivalent of a caching wrapper: the
    /// `(namespace, ttl)` policy lives in the key, the cached computation
    /// stays visible where it is invoked.
    pub async fn fetch_or_compute<T, E, F, Fut>(&self, key: &CacheKey, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get::<T>(key).await {
            return Ok(cached);
        }
        let value = compute().await?;
        self.set(key, &value).await;
        Ok(value)
    }

    /// Delete one exact key
    pub async fn remove(&self, key: &CacheKey) {
        match self.storage.remove(key.as_str()).await {
            Ok(true) => self.metrics.record_invalidation(),
            Ok(false) => {}
            Err(e) => {
                warn!(key = %key, error = %e, "cache delete failed");
                self.metrics.record_backend_error();
            }
        }
    }

    /// Delete every key in a namespace
    pub async fn invalidate_namespace(&self, namespace: Namespace) {
        let prefix = format!("{}_", namespace.prefix());
        match self.storage.remove_prefix(&prefix).await {
            Ok(removed) => {
                debug!(namespace = %namespace, removed, "namespace invalidated");
                for _ in 0..removed {
                    self.metrics.record_invalidation();
                }
            }
            Err(e) => {
                warn!(namespace = %namespace, error = %e, "namespace invalidation failed");
                self.metrics.record_backend_error();
            }
        }
    }
}
