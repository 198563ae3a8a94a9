//! Cache (C3) implementation.
//!
//! Size-bounded, TTL-keyed storage backed by `moka`'s async cache (the
//! teacher's own `MokaCacheProvider` choice, generalized to opaque JSON
//! values). The singleflight guard is a separate `Mutex<HashMap<CacheKey,
//! Arc<Notify>>>` of in-flight markers: moka handles storage and eviction,
//! this crate handles "only one computation per key at a time" on top of
//! it, since moka itself has no coalescing primitive for async value
//! construction that lives outside the cache.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mnemolite_domain::ports::{CacheKey, CacheProvider};
use moka::future::Cache;
use tokio::sync::Notify;

/// Moka-backed cache with a singleflight in-flight guard.
pub struct MokaCacheProvider {
    store: Cache<CacheKey, serde_json::Value>,
    ttl: Duration,
    max_entries: usize,
    in_flight: Mutex<HashMap<CacheKey, std::sync::Arc<Notify>>>,
}

impl MokaCacheProvider {
    /// Build a cache bounded to `max_entries` live entries, each expiring
    /// `ttl` after insertion.
    #[must_use]
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            store: Cache::builder()
                .max_capacity(max_entries as u64)
                .time_to_live(ttl)
                .build(),
            ttl,
            max_entries,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Run `compute` to populate `key`, coalescing concurrent callers for
    /// the same key into a single computation (singleflight, §4.3).
    pub async fn get_or_compute<F, Fut>(&self, key: CacheKey, compute: F) -> serde_json::Value
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = serde_json::Value>,
    {
        if let Some(value) = self.get(&key).await {
            return value;
        }

        let notify = {
            let mut guard = self.in_flight.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(existing) = guard.get(&key) {
                Some(std::sync::Arc::clone(existing))
            } else {
                guard.insert(key.clone(), std::sync::Arc::new(Notify::new()));
                None
            }
        };

        if let Some(notify) = notify {
            notify.notified().await;
            return self.get(&key).await.unwrap_or(serde_json::Value::Null);
        }

        let value = compute().await;
        self.put(key.clone(), value.clone()).await;

        let notify = {
            let mut guard = self.in_flight.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.remove(&key)
        };
        if let Some(notify) = notify {
            notify.notify_waiters();
        }
        value
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        self.store.get(key).await
    }

    async fn put(&self, key: CacheKey, value: serde_json::Value) {
        self.store.insert(key, value).await;
    }

    async fn invalidate(&self, key: &CacheKey) {
        self.store.invalidate(key).await;
    }

    fn max_entries(&self) -> usize {
        self.max_entries
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let cache = MokaCacheProvider::new(10, Duration::from_secs(60));
        cache.put("k1".to_string(), serde_json::json!({"a": 1})).await;
        assert_eq!(cache.get(&"k1".to_string()).await, Some(serde_json::json!({"a": 1})));
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let cache = MokaCacheProvider::new(10, Duration::from_secs(60));
        cache.put("k1".to_string(), serde_json::json!(1)).await;
        cache.invalidate(&"k1".to_string()).await;
        assert_eq!(cache.get(&"k1".to_string()).await, None);
    }

    #[tokio::test]
    async fn concurrent_get_or_compute_runs_once() {
        let cache = Arc::new(MokaCacheProvider::new(10, Duration::from_secs(60)));
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_compute("shared".to_string(), || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        serde_json::json!({"computed": true})
                    })
                    .await
            }));
        }
        for h in handles {
            let value = h.await.unwrap();
            assert_eq!(value, serde_json::json!({"computed": true}));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
