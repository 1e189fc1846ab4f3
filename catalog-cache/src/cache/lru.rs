//! Capacity-bounded cache with least-recently-used eviction

use crate::cache::types::CacheStats;
use std::borrow::Borrow;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Keyed cache holding at most `capacity` entries
///
/// When a new key is inserted into a full cache, the least recently used
/// entry is evicted first. Reads refresh recency. Like [`KeyedCache`], all
/// access is serialized through one lock and clones share storage.
///
/// [`KeyedCache`]: crate::cache::KeyedCache
pub struct BoundedCache<K, V> {
    capacity: usize,
    enable_metrics: bool,
    store: Arc<RwLock<LruStore<K, V>>>,
}

struct LruStore<K, V> {
    entries: HashMap<K, V>,

    /// Access order, least recently used at the front
    lru_queue: VecDeque<K>,

    stats: CacheStats,
}

impl<K, V> Clone for BoundedCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            capacity: self.capacity,
            enable_metrics: self.enable_metrics,
            store: Arc::clone(&self.store),
        }
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
    V: Clone,
{
    /// Create an empty cache; a capacity of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let store = LruStore {
            entries: HashMap::new(),
            lru_queue: VecDeque::new(),
            stats: CacheStats::default(),
        };

        Self {
            capacity: capacity.max(1),
            enable_metrics: true,
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Switch hit/miss accounting on or off; inserts and evictions are always counted
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = enabled;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a value and mark it most recently used
    pub async fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let mut store = self.store.write().await;

        match store.entries.get(key).cloned() {
            Some(value) => {
                store.stats.record_hit(self.enable_metrics);
                store.touch(key);
                debug!("Bounded cache hit: {:?}", key);
                Some(value)
            }
            None => {
                store.stats.record_miss(self.enable_metrics);
                debug!("Bounded cache miss: {:?}", key);
                None
            }
        }
    }

    /// Insert or overwrite a value, evicting the LRU entry if the cache is full
    pub async fn set(&self, key: K, value: V) {
        let mut store = self.store.write().await;
        store.put(key, value, self.capacity);
    }

    /// Return the cached value for `key`, inserting `value` only if absent
    ///
    /// Concurrent loaders of the same key all end up holding the value of
    /// whichever one inserted first.
    pub async fn get_or_insert(&self, key: K, value: V) -> V {
        let mut store = self.store.write().await;

        if let Some(existing) = store.entries.get(&key).cloned() {
            store.touch(&key);
            debug!("Keeping value already cached for {:?}", key);
            return existing;
        }

        store.put(key, value.clone(), self.capacity);
        value
    }

    /// Check if a key exists (without refreshing recency)
    pub async fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let store = self.store.read().await;
        store.entries.contains_key(key)
    }

    pub async fn stats(&self) -> CacheStats {
        let store = self.store.read().await;
        store.stats.clone()
    }

    pub async fn len(&self) -> usize {
        let store = self.store.read().await;
        store.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        let store = self.store.read().await;
        store.entries.is_empty()
    }
}

impl<K, V> LruStore<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    /// Move `key` to the most recently used end of the queue
    fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if let Some(pos) = self.lru_queue.iter().position(|k| <K as Borrow<Q>>::borrow(k) == key) {
            if let Some(k) = self.lru_queue.remove(pos) {
                self.lru_queue.push_back(k);
            }
        }
    }

    fn put(&mut self, key: K, value: V, capacity: usize) {
        if self.entries.contains_key(&key) {
            self.entries.insert(key.clone(), value);
            self.touch(&key);
        } else {
            while self.entries.len() >= capacity {
                match self.lru_queue.pop_front() {
                    Some(evicted) => {
                        debug!("Evicting least recently used entry: {:?}", evicted);
                        self.entries.remove(&evicted);
                        self.stats.evictions += 1;
                    }
                    None => break,
                }
            }

            self.entries.insert(key.clone(), value);
            self.lru_queue.push_back(key);
        }

        self.stats.inserts += 1;
        self.stats.entries = self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(3);

        cache.set("key1".to_string(), 1).await;
        cache.set("key2".to_string(), 2).await;
        cache.set("key3".to_string(), 3).await;

        // Touch key1 so key2 becomes the least recently used
        assert_eq!(cache.get("key1").await, Some(1));

        cache.set("key4".to_string(), 4).await;

        assert!(!cache.contains_key("key2").await);
        assert!(cache.contains_key("key1").await);
        assert!(cache.contains_key("key3").await);
        assert!(cache.contains_key("key4").await);
        assert_eq!(cache.len().await, 3);

        let stats = cache.stats().await;
        assert_eq!(stats.evictions, 1);
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(2);

        cache.set("a".to_string(), 1).await;
        cache.set("b".to_string(), 2).await;
        cache.set("a".to_string(), 10).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get("a").await, Some(10));
        assert_eq!(cache.stats().await.evictions, 0);
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_recency() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(2);

        cache.set("a".to_string(), 1).await;
        cache.set("b".to_string(), 2).await;
        cache.set("a".to_string(), 3).await;
        cache.set("c".to_string(), 4).await;

        assert!(cache.contains_key("a").await);
        assert!(!cache.contains_key("b").await);
    }

    #[tokio::test]
    async fn test_get_or_insert_keeps_first_value() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(4);

        assert_eq!(cache.get_or_insert("a".to_string(), 1).await, 1);
        assert_eq!(cache.get_or_insert("a".to_string(), 2).await, 1);
        assert_eq!(cache.get("a").await, Some(1));
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(0);
        assert_eq!(cache.capacity(), 1);

        cache.set("a".to_string(), 1).await;
        cache.set("b".to_string(), 2).await;

        assert_eq!(cache.len().await, 1);
        assert!(cache.contains_key("b").await);
    }

    #[tokio::test]
    async fn test_hit_miss_stats() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(2);
        cache.set("a".to_string(), 1).await;

        cache.get("a").await;
        cache.get("missing").await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_metrics_switch_off_skips_lookups() {
        let cache: BoundedCache<String, u32> = BoundedCache::new(2).with_metrics(false);
        cache.set("a".to_string(), 1).await;

        assert_eq!(cache.get("a").await, Some(1));
        cache.get("missing").await;

        let stats = cache.stats().await;
        assert_eq!(stats.lookups(), 0);
        assert_eq!(stats.inserts, 1);
    }
}
