//! Cache entry with access metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value together with its key and metadata
///
/// Values are written once per fetch and never updated in place; a repeated
/// write replaces the whole entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<K, V> {
    /// The cache key
    pub key: K,

    /// The cached value
    pub value: V,

    /// Entry metadata
    pub metadata: CacheMetadata,
}

impl<K, V> CacheEntry<K, V> {
    /// Create a new entry stamped with the current time
    pub fn new(key: K, value: V) -> Self {
        let now = Utc::now();

        Self {
            key,
            value,
            metadata: CacheMetadata {
                fetched_at: now,
                accessed_at: now,
                access_count: 0,
            },
        }
    }

    /// Record a read
    pub fn mark_accessed(&mut self) {
        self.metadata.accessed_at = Utc::now();
        self.metadata.access_count += 1;
    }
}

/// Metadata associated with a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// When the value was written into the cache
    pub fetched_at: DateTime<Utc>,

    /// Last read time
    pub accessed_at: DateTime<Utc>,

    /// Number of reads served from this entry
    pub access_count: u64,
}

impl CacheMetadata {
    /// Time since the value was written
    pub fn age(&self) -> Duration {
        (Utc::now() - self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
