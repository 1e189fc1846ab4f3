//! # Caching layer
//!
//! Two in-memory cache flavours sit behind the fetch orchestration:
//!
//! - [`KeyedCache`]: unbounded, entries live for the process lifetime. Backs the
//!   batch fetch orchestrator.
//! - [`BoundedCache`]: fixed capacity with least-recently-used eviction. Backs
//!   the decoded-image cache.
//!
//! Both serialize every access through a single lock and hand out cheap,
//! storage-sharing clones so concurrent fetch tasks can write results directly.
//!
//! ## Example
//!
//! ```rust
//! use catalog_cache::cache::KeyedCache;
//!
//! # async fn example() {
//! let cache: KeyedCache<String, String> = KeyedCache::new();
//!
//! cache.set("nft:123".to_string(), "cached nft".to_string()).await;
//!
//! if let Some(value) = cache.get("nft:123").await {
//!     println!("Cache hit: {}", value);
//! }
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod lru;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::{CacheEntry, CacheMetadata};
pub use lru::BoundedCache;
pub use store::KeyedCache;
pub use types::{CacheStats, Identifier};
