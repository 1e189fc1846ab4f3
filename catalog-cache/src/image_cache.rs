//! Decoded-image cache keyed by resource locator
//!
//! Images are fetched and decoded one locator at a time. Decoded images are
//! kept in a [`BoundedCache`] with least-recently-used eviction, so memory use
//! is capped by `CacheConfig::image_capacity` rather than by memory pressure.

use crate::cache::{BoundedCache, CacheConfig, CacheStats, Identifier};
use crate::error::{FetchError, Result};
use crate::fetch::ImageSource;
use image::DynamicImage;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to a decoded image
pub type DecodedImage = Arc<DynamicImage>;

/// Bounded cache of decoded images keyed by locator string
#[derive(Clone)]
pub struct ImageCache {
    cache: BoundedCache<Identifier, DecodedImage>,
}

impl ImageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: BoundedCache::new(capacity),
        }
    }

    /// Capacity and hit/miss accounting taken from `config`
    pub fn with_config(config: &CacheConfig) -> Self {
        Self {
            cache: BoundedCache::new(config.image_capacity).with_metrics(config.enable_metrics),
        }
    }

    pub async fn get(&self, locator: &str) -> Option<DecodedImage> {
        self.cache.get(locator).await
    }

    pub async fn set(&self, locator: impl Into<Identifier>, image: DecodedImage) {
        self.cache.set(locator.into(), image).await;
    }

    /// Keep the image already cached for `locator`, or cache `image`
    pub async fn get_or_insert(&self, locator: impl Into<Identifier>, image: DecodedImage) -> DecodedImage {
        self.cache.get_or_insert(locator.into(), image).await
    }

    pub async fn contains(&self, locator: &str) -> bool {
        self.cache.contains_key(locator).await
    }

    pub async fn len(&self) -> usize {
        self.cache.len().await
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.is_empty().await
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

/// Cache-aside image loader: cache lookup, then fetch and decode
pub struct ImageLoader<S> {
    cache: ImageCache,
    source: Arc<S>,
}

impl<S> ImageLoader<S>
where
    S: ImageSource + 'static,
{
    pub fn new(source: S, cache: ImageCache) -> Self {
        Self {
            cache,
            source: Arc::new(source),
        }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Load the decoded image behind `locator`
    ///
    /// Concurrent loads of one locator may each fetch, but all of them return
    /// the single value that ends up cached.
    pub async fn load(&self, locator: &str) -> Result<DecodedImage> {
        if let Some(image) = self.cache.get(locator).await {
            return Ok(image);
        }

        debug!("Image cache miss, fetching {}", locator);
        let bytes = self.source.fetch_bytes(locator).await?;
        let image = decode(locator, bytes).await?;

        Ok(self.cache.get_or_insert(locator, Arc::new(image)).await)
    }
}

/// Decode off the async worker threads
async fn decode(locator: &str, bytes: Vec<u8>) -> Result<DynamicImage> {
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| FetchError::TaskFailed {
            key: locator.to_string(),
            reason: e.to_string(),
        })?;

    decoded.map_err(|e| FetchError::Decode(format!("{}: {}", locator, e)))
}
