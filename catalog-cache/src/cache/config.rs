//! Configuration for the cache and fetch layer

use crate::error::{FetchError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for caches and batch fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of decoded images kept by the image cache
    /// Least recently used images are evicted past this bound
    pub image_capacity: usize,

    /// Ceiling on concurrent retrievals across all batches of one orchestrator
    /// `None` spawns one retrieval per missing key with no limit
    pub max_concurrency: Option<usize>,

    /// Enable hit/miss accounting
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            image_capacity: 256,
            max_concurrency: None,
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.image_capacity == 0 {
            return Err(FetchError::Config(
                "image_capacity must be greater than 0".to_string(),
            ));
        }

        if self.max_concurrency == Some(0) {
            return Err(FetchError::Config(
                "max_concurrency must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    image_capacity: Option<usize>,
    max_concurrency: Option<usize>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set the number of decoded images to keep
    pub fn image_capacity(mut self, capacity: usize) -> Self {
        self.image_capacity = Some(capacity);
        self
    }

    /// Cap the number of concurrent retrievals per batch
    pub fn max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = Some(max);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            image_capacity: self.image_capacity.unwrap_or(defaults.image_capacity),
            max_concurrency: self.max_concurrency.or(defaults.max_concurrency),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}

/// Preset configurations for common use cases
impl CacheConfig {
    /// Memory-constrained clients
    pub fn small() -> Self {
        Self {
            image_capacity: 32,
            max_concurrency: Some(4),
            ..Default::default()
        }
    }

    /// Large screens showing many items at once
    pub fn large() -> Self {
        Self {
            image_capacity: 2_048,
            max_concurrency: Some(64),
            ..Default::default()
        }
    }

    /// Default sizing with a fan-out ceiling of `max_concurrency`
    pub fn bounded(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: Some(max_concurrency),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.image_capacity, 256);
        assert_eq!(config.max_concurrency, None);
        assert!(config.enable_metrics);
    }

    #[test]
    fn test_config_validation() {
        assert!(CacheConfig::default().validate().is_ok());

        let invalid = CacheConfig {
            image_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(invalid.validate(), Err(FetchError::Config(_))));

        let invalid = CacheConfig::bounded(0);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::builder()
            .image_capacity(10)
            .max_concurrency(3)
            .enable_metrics(false)
            .build();

        assert_eq!(config.image_capacity, 10);
        assert_eq!(config.max_concurrency, Some(3));
        assert!(!config.enable_metrics);
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(CacheConfig::small().image_capacity, 32);
        assert_eq!(CacheConfig::large().max_concurrency, Some(64));
        assert_eq!(CacheConfig::bounded(8).max_concurrency, Some(8));
        assert!(CacheConfig::small().validate().is_ok());
    }
}
