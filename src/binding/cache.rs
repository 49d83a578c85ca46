//! Time-boxed cache for data source results.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: Value,
    /// Monotonic fetch time, used for TTL checks.
    pub fetched_at: Instant,
    /// Wall-clock completion time of the fetch.
    pub completed_at: DateTime<Utc>,
    /// The value is a fallback standing in for a failed fetch.
    pub is_fallback: bool,
}

impl CacheEntry {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            completed_at: Utc::now(),
            is_fallback: false,
        }
    }

    pub fn fallback(value: Value) -> Self {
        Self {
            is_fallback: true,
            ..Self::new(value)
        }
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// Thread-safe map of serialized source configuration to last result.
/// Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct SourceCache {
    inner: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for `key` if it is younger than `ttl`.
    pub async fn get_fresh(&self, key: &str, ttl: Duration) -> Option<CacheEntry> {
        let entries = self.inner.lock().await;
        entries.get(key).filter(|entry| entry.is_fresh(ttl)).cloned()
    }

    pub async fn insert(&self, key: String, entry: CacheEntry) {
        self.inner.lock().await.insert(key, entry);
    }

    pub async fn remove(&self, key: &str) {
        self.inner.lock().await.remove(key);
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = SourceCache::new();
        cache
            .insert("k".to_string(), CacheEntry::new(json!({"count": 1})))
            .await;

        let ttl = Duration::from_millis(500);
        assert!(cache.get_fresh("k", ttl).await.is_some());

        tokio::time::advance(Duration::from_millis(499)).await;
        assert!(cache.get_fresh("k", ttl).await.is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.get_fresh("k", ttl).await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = SourceCache::new();
        let shared = cache.clone();
        shared.insert("a".to_string(), CacheEntry::new(json!(1))).await;
        shared.insert("b".to_string(), CacheEntry::new(json!(2))).await;
        assert_eq!(cache.len().await, 2);

        cache.remove("a").await;
        assert!(shared.get_fresh("a", Duration::from_secs(60)).await.is_none());
        assert!(shared.get_fresh("b", Duration::from_secs(60)).await.is_some());

        cache.clear().await;
        assert_eq!(shared.len().await, 0);
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let entry = CacheEntry::new(json!(null));
        assert!(!entry.is_fresh(Duration::ZERO));
    }
}
