//! Cache port (C3)
//!
//! A size-bounded, TTL-keyed cache of response envelopes, keyed by a
//! canonical fingerprint of the request. Implementations provide a
//! singleflight guard so at most one in-flight computation happens per key;
//! other callers await the first result rather than recomputing.

use async_trait::async_trait;

/// Canonical fingerprint of a cacheable request: query text + filters +
/// limit + fusion parameters. Never includes secrets.
pub type CacheKey = String;

/// Size-bounded, TTL-keyed cache with a singleflight guard.
///
/// Implementations store values as opaque JSON so a single cache can serve
/// multiple response envelope shapes (hybrid search, graph traversal).
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Fetch a cached value if present and not expired.
    async fn get(&self, key: &CacheKey) -> Option<serde_json::Value>;

    /// Insert or replace a value, resetting its TTL.
    async fn put(&self, key: CacheKey, value: serde_json::Value);

    /// Evict a key immediately (used on invalidation).
    async fn invalidate(&self, key: &CacheKey);

    /// Maximum number of live entries (LRU eviction beyond this).
    fn max_entries(&self) -> usize;

    /// Configured time-to-live.
    fn ttl(&self) -> std::time::Duration;
}
