//! Unbounded keyed cache shared by concurrent fetch tasks

use crate::cache::{
    config::CacheConfig,
    entry::{CacheEntry, CacheMetadata},
    types::CacheStats,
};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory mapping from key to previously retrieved value
///
/// Every read and write goes through one `RwLock`, so fetch tasks writing
/// results concurrently never race on the map. The handle is cheap to clone;
/// clones share the same storage.
///
/// Entries are never evicted and have no TTL. Growth is bounded only by the
/// number of distinct keys ever fetched during the process lifetime.
pub struct KeyedCache<K, V> {
    store: Arc<RwLock<CacheStore<K, V>>>,
    enable_metrics: bool,
}

struct CacheStore<K, V> {
    entries: HashMap<K, CacheEntry<K, V>>,
    stats: CacheStats,
}

impl<K, V> Clone for KeyedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            enable_metrics: self.enable_metrics,
        }
    }
}

impl<K, V> Default for KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Create an empty cache with metrics enabled
    pub fn new() -> Self {
        Self::with_config(&CacheConfig::default())
    }

    /// Create an empty cache honoring the metrics switch of `config`
    pub fn with_config(config: &CacheConfig) -> Self {
        let store = CacheStore {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        };

        Self {
            store: Arc::new(RwLock::new(store)),
            enable_metrics: config.enable_metrics,
        }
    }

    /// Get a value from the cache
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let mut store = self.store.write().await;
        let store = &mut *store;

        match store.entries.get_mut(key) {
            Some(entry) => {
                entry.mark_accessed();
                store.stats.record_hit(self.enable_metrics);
                debug!("Cache hit: {:?}", key);
                Some(entry.value.clone())
            }
            None => {
                store.stats.record_miss(self.enable_metrics);
                debug!("Cache miss: {:?}", key);
                None
            }
        }
    }

    /// Insert a value, replacing any previous value for the key
    pub async fn set(&self, key: K, value: V) {
        let mut store = self.store.write().await;

        debug!("Caching entry: {:?}", key);
        store
            .entries
            .insert(key.clone(), CacheEntry::new(key, value));
        store.stats.inserts += 1;
        store.stats.entries = store.entries.len();
    }

    /// Split `keys` into cached values and keys that must be fetched
    ///
    /// Runs under a single lock acquisition so the split is consistent.
    pub async fn partition<I>(&self, keys: I) -> (Vec<V>, Vec<K>)
    where
        I: IntoIterator<Item = K>,
    {
        let mut store = self.store.write().await;
        let store = &mut *store;

        let mut hits = Vec::new();
        let mut misses = Vec::new();

        for key in keys {
            match store.entries.get_mut(&key) {
                Some(entry) => {
                    entry.mark_accessed();
                    store.stats.record_hit(self.enable_metrics);
                    hits.push(entry.value.clone());
                }
                None => {
                    store.stats.record_miss(self.enable_metrics);
                    misses.push(key);
                }
            }
        }

        (hits, misses)
    }

    /// Check if a key exists in the cache (without touching access metadata)
    pub async fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let store = self.store.read().await;
        store.entries.contains_key(key)
    }

    /// Fetch time and read count of the entry for `key`
    pub async fn metadata<Q>(&self, key: &Q) -> Option<CacheMetadata>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let store = self.store.read().await;
        store.entries.get(key).map(|entry| entry.metadata.clone())
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        store.stats.clone()
    }

    /// Get number of entries in cache
    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        let store = self.store.read().await;
        store.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_set_and_get() {
        let cache: KeyedCache<String, String> = KeyedCache::new();

        cache.set("key1".to_string(), "value1".to_string()).await;

        let value = cache.get("key1").await;
        assert_eq!(value, Some("value1".to_string()));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let cache: KeyedCache<String, String> = KeyedCache::new();

        assert_eq!(cache.get("nonexistent").await, None);

        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_set_overwrites_and_is_idempotent() {
        let cache: KeyedCache<String, u32> = KeyedCache::new();

        cache.set("a".to_string(), 1).await;
        cache.set("a".to_string(), 1).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("a").await, Some(1));

        cache.set("a".to_string(), 2).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("a").await, Some(2));
    }

    #[tokio::test]
    async fn test_partition() {
        let cache: KeyedCache<String, u32> = KeyedCache::new();
        cache.set("a".to_string(), 1).await;
        cache.set("b".to_string(), 2).await;

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let (mut hits, misses) = cache.partition(keys).await;
        hits.sort();

        assert_eq!(hits, vec![1, 2]);
        assert_eq!(misses, vec!["c".to_string()]);

        let stats = cache.stats().await;
        assert_eq!((stats.hits, stats.misses), (2, 1));
    }

    #[tokio::test]
    async fn test_contains_key_does_not_count() {
        let cache: KeyedCache<String, u32> = KeyedCache::new();
        cache.set("a".to_string(), 1).await;

        assert!(cache.contains_key("a").await);
        assert!(!cache.contains_key("b").await);

        let stats = cache.stats().await;
        assert_eq!(stats.hits + stats.misses, 0);
    }

    #[tokio::test]
    async fn test_metrics_disabled() {
        let config = CacheConfig::builder().enable_metrics(false).build();
        let cache: KeyedCache<String, u32> = KeyedCache::with_config(&config);

        cache.set("a".to_string(), 1).await;
        cache.get("a").await;
        cache.get("b").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.inserts, 1);
    }

    #[tokio::test]
    async fn test_metadata_tracks_reads() {
        let cache: KeyedCache<String, u32> = KeyedCache::new();
        assert!(cache.metadata("a").await.is_none());

        cache.set("a".to_string(), 1).await;
        cache.get("a").await;
        cache.partition(vec!["a".to_string()]).await;

        let metadata = cache.metadata("a").await.unwrap();
        assert_eq!(metadata.access_count, 2);
        assert!(metadata.accessed_at >= metadata.fetched_at);
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache: KeyedCache<String, u32> = KeyedCache::new();
        let other = cache.clone();

        other.set("shared".to_string(), 7).await;
        assert_eq!(cache.get("shared").await, Some(7));
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let cache: KeyedCache<String, usize> = KeyedCache::new();

        let mut handles = Vec::new();
        for i in 0..50 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache.set(format!("key-{}", i), i).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await, 50);
        assert_eq!(cache.get("key-49").await, Some(49));
    }
}
