//! Graph Traversal orchestration (C10)
//!
//! A thin cache layer in front of [`GraphTraversal`]. Traversal queries are
//! read-only and idempotent for a fixed graph snapshot, so a plain
//! cache-aside strategy (no singleflight) is sufficient here — unlike
//! hybrid search, a duplicate concurrent traversal is cheap and bounded by
//! the same `MAX_VISITED`-style cap the provider already enforces.

use std::sync::Arc;

use mnemolite_domain::entities::EdgeType;
use mnemolite_domain::error::Result;
use mnemolite_domain::ports::{CacheProvider, Direction, GraphTraversal, NeighborsResult, ShortestPathResult};
use sha2::{Digest, Sha256};

/// Cache-aside wrapper around a [`GraphTraversal`] provider.
pub struct CachedTraversal {
    inner: Arc<dyn GraphTraversal>,
    cache: Arc<dyn CacheProvider>,
}

impl CachedTraversal {
    /// Build an orchestration layer over `inner`, caching results through
    /// `cache`.
    #[must_use]
    pub fn new(inner: Arc<dyn GraphTraversal>, cache: Arc<dyn CacheProvider>) -> Self {
        Self { inner, cache }
    }

    fn fingerprint(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(b"\0");
        }
        hex::encode(hasher.finalize())
    }

    /// Cached `neighbors`: bounded BFS from `node` (§4.10).
    pub async fn neighbors(
        &self,
        node: &str,
        depth: usize,
        edge_types: &[EdgeType],
        direction: Direction,
    ) -> Result<NeighborsResult> {
        let edge_types_key: String = edge_types.iter().map(EdgeType::as_str).collect::<Vec<_>>().join(",");
        let direction_key = format!("{direction:?}");
        let key = Self::fingerprint(&["neighbors", node, &depth.to_string(), &edge_types_key, &direction_key]);

        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(result) = serde_json::from_value::<NeighborsResult>(cached) {
                return Ok(result);
            }
        }

        let result = self.inner.neighbors(node, depth, edge_types, direction).await?;
        if let Ok(value) = serde_json::to_value(&result) {
            self.cache.put(key, value).await;
        }
        Ok(result)
    }

    /// Cached `shortest_path` between `a` and `b`.
    pub async fn shortest_path(&self, a: &str, b: &str, edge_types: &[EdgeType]) -> Result<ShortestPathResult> {
        let edge_types_key: String = edge_types.iter().map(EdgeType::as_str).collect::<Vec<_>>().join(",");
        let key = Self::fingerprint(&["shortest_path", a, b, &edge_types_key]);

        if let Some(cached) = self.cache.get(&key).await {
            if let Ok(result) = serde_json::from_value::<ShortestPathResult>(cached) {
                return Ok(result);
            }
        }

        let result = self.inner.shortest_path(a, b, edge_types).await?;
        if let Ok(value) = serde_json::to_value(&result) {
            self.cache.put(key, value).await;
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mnemolite_domain::ports::CacheKey;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::Mutex;

    struct CountingTraversal {
        calls: AtomicU32,
    }

    #[async_trait]
    impl GraphTraversal for CountingTraversal {
        async fn neighbors(
            &self,
            _node: &str,
            _depth: usize,
            _edge_types: &[EdgeType],
            _direction: Direction,
        ) -> Result<NeighborsResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(NeighborsResult {
                nodes: Vec::new(),
                edges: Vec::new(),
                truncated: false,
            })
        }
        async fn shortest_path(&self, _a: &str, _b: &str, _edge_types: &[EdgeType]) -> Result<ShortestPathResult> {
            Ok(ShortestPathResult {
                nodes: Vec::new(),
                edges: Vec::new(),
                truncated: false,
            })
        }
    }

    struct InMemoryCache {
        store: Mutex<HashMap<CacheKey, serde_json::Value>>,
    }

    impl InMemoryCache {
        fn new() -> Self {
            Self { store: Mutex::new(HashMap::new()) }
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
    async fn repeated_neighbors_call_hits_cache() {
        let inner = Arc::new(CountingTraversal { calls: AtomicU32::new(0) });
        let cached = CachedTraversal::new(inner.clone(), Arc::new(InMemoryCache::new()));

        cached.neighbors("n1", 2, &[EdgeType::Calls], Direction::Out).await.unwrap();
        cached.neighbors("n1", 2, &[EdgeType::Calls], Direction::Out).await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }
}
