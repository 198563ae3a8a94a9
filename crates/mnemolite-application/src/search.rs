//! Hybrid Search orchestration (C9)
//!
//! A thin layer in front of [`HybridSearchProvider`] adding the response
//! cache and singleflight guard named in §4.3: concurrent callers asking
//! the same fingerprinted question share one computation, and a repeated
//! question within the cache's TTL skips the provider entirely.
//!
//! Deliberately independent of any concrete cache implementation — the
//! singleflight coalescing is implemented here against the `CacheProvider`
//! port alone (`get`/`put`), so this orchestration layer stays provider-
//! agnostic per the application crate's dependency rule.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use mnemolite_domain::entities::MemoryFilter;
use mnemolite_domain::error::Result;
use mnemolite_domain::ports::{CacheProvider, HybridSearchProvider, MemorySearchResponse, SearchFilters, SearchResponse};
use sha2::{Digest, Sha256};
use tokio::sync::Notify;

/// Cache/singleflight wrapper around a [`HybridSearchProvider`].
pub struct CachedHybridSearch {
    inner: Arc<dyn HybridSearchProvider>,
    cache: Arc<dyn CacheProvider>,
    in_flight: Mutex<HashMap<String, Arc<Notify>>>,
}

impl CachedHybridSearch {
    /// Build an orchestration layer over `inner`, caching response
    /// envelopes through `cache`.
    #[must_use]
    pub fn new(inner: Arc<dyn HybridSearchProvider>, cache: Arc<dyn CacheProvider>) -> Self {
        Self {
            inner,
            cache,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    fn fingerprint(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }

    /// Await the in-flight computation for `key` if one is running,
    /// registering as its sole runner otherwise. Returns `Some(permit)`
    /// when this caller must compute the value itself.
    async fn acquire_or_wait(&self, key: &str) -> Option<()> {
        loop {
            let notify = {
                let mut guard = self.in_flight.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                if let Some(existing) = guard.get(key) {
                    Some(Arc::clone(existing))
                } else {
                    guard.insert(key.to_string(), Arc::new(Notify::new()));
                    None
                }
            };
            match notify {
                Some(notify) => {
                    notify.notified().await;
                    if self.cache.get(&key.to_string()).await.is_some() {
                        return None;
                    }
                    // The prior runner's computation was itself cached-miss
                    // (e.g. it errored without populating the cache); retry
                    // as the new sole runner.
                }
                None => return Some(()),
            }
        }
    }

    fn release(&self, key: &str) {
        let notify = {
            let mut guard = self.in_flight.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.remove(key)
        };
        if let Some(notify) = notify {
            notify.notify_waiters();
        }
    }

    /// Run a cached, singleflight-coalesced code search.
    pub async fn search_code(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
        deadline: Instant,
    ) -> Result<SearchResponse> {
        let filters_json = serde_json::to_string(filters).unwrap_or_default();
        let key = Self::fingerprint(&["code", query, &filters_json, &limit.to_string()]);

        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(response) = serde_json::from_value::<SearchResponse>(cached) {
                return Ok(response);
            }
        }

        if self.acquire_or_wait(&key).await.is_none() {
            if let Some(cached) = self.cache.get(&key).await {
                if let Ok(response) = serde_json::from_value::<SearchResponse>(cached) {
                    return Ok(response);
                }
            }
        }

        let result = self.inner.search_code(query, filters, limit, deadline).await;
        if let Ok(response) = &result {
            if let Ok(value) = serde_json::to_value(response) {
                self.cache.put(key.clone(), value).await;
            }
        }
        self.release(&key);
        result
    }

    /// Run a cached, singleflight-coalesced memory search.
    pub async fn search_memories(
        &self,
        query: &str,
        filter: &MemoryFilter,
        limit: usize,
        deadline: Instant,
    ) -> Result<MemorySearchResponse> {
        let filter_json = serde_json::to_string(filter).unwrap_or_default();
        let key = Self::fingerprint(&["memories", query, &filter_json, &limit.to_string()]);

        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(response) = serde_json::from_value::<MemorySearchResponse>(cached) {
                return Ok(response);
            }
        }

        if self.acquire_or_wait(&key).await.is_none() {
            if let Some(cached) = self.cache.get(&key).await {
                if let Ok(response) = serde_json::from_value::<MemorySearchResponse>(cached) {
                    return Ok(response);
                }
            }
        }

        let result = self.inner.search_memories(query, filter, limit, deadline).await;
        if let Ok(response) = &result {
            if let Ok(value) = serde_json::to_value(response) {
                self.cache.put(key.clone(), value).await;
            }
        }
        self.release(&key);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemolite_domain::ports::{ChannelStatus, CacheKey};
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingHybridSearch {
        calls: AtomicU32,
    }

    #[async_trait]
    impl HybridSearchProvider for CountingHybridSearch {
        async fn search_code(
            &self,
            _query: &str,
            _filters: &SearchFilters,
            _limit: usize,
            _deadline: Instant,
        ) -> Result<SearchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResponse {
                results: Vec::new(),
                degraded: false,
                partial: false,
                lexical_status: ChannelStatus::Ok,
                vector_status: ChannelStatus::Ok,
            })
        }
        async fn search_memories(
            &self,
            _query: &str,
            _filter: &MemoryFilter,
            _limit: usize,
            _deadline: Instant,
        ) -> Result<MemorySearchResponse> {
            Ok(MemorySearchResponse {
                results: Vec::new(),
                degraded: false,
                partial: false,
                lexical_status: ChannelStatus::Ok,
                vector_status: ChannelStatus::Ok,
            })
        }
    }

    struct InMemoryCache {
        store: tokio::sync::Mutex<HashMap<CacheKey, serde_json::Value>>,
    }

    impl InMemoryCache {
        fn new() -> Self {
            Self {
                store: tokio::sync::Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl CacheProvider for InMemoryCache {
        async fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
            self.store.lock().await.get(key).cloned()
        }
        async fn put(&self, key: CacheKey, value: serde_json::Value) {
            self.store.lock().await.insert(key, value);
        }
        async fn invalidate(&self, key: &CacheKey) {
            self.store.lock().await.remove(key);
        }
        fn max_entries(&self) -> usize {
            1000
        }
        fn ttl(&self) -> std::time::Duration {
            std::time::Duration::from_secs(60)
        }
    }

    #[tokio::test]
    async fn repeated_query_hits_cache_without_recomputing() {
        let inner = Arc::new(CountingHybridSearch { calls: AtomicU32::new(0) });
        let cached = CachedHybridSearch::new(inner.clone(), Arc::new(InMemoryCache::new()));
        let filters = SearchFilters::default();
        let deadline = Instant::now() + std::time::Duration::from_secs(1);

        cached.search_code("hashmap", &filters, 10, deadline).await.unwrap();
        cached.search_code("hashmap", &filters, 10, deadline).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_queries_each_compute() {
        let inner = Arc::new(CountingHybridSearch { calls: AtomicU32::new(0) });
        let cached = CachedHybridSearch::new(inner.clone(), Arc::new(InMemoryCache::new()));
        let filters = SearchFilters::default();
        let deadline = Instant::now() + std::time::Duration::from_secs(1);

        cached.search_code("hashmap", &filters, 10, deadline).await.unwrap();
        cached.search_code("btreemap", &filters, 10, deadline).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
