//! Domain services and the composition root that wires them
//!
//! [`ServicesAssembly`] builds one HTTP client and one instance of each shared
//! cache, then hands them to the services it creates. Nothing here is global:
//! two assemblies never share state.

pub mod cart;
pub mod nft;
pub mod payment;
pub mod profile;
pub mod statistics;

pub use cart::CartService;
pub use nft::NftService;
pub use payment::PaymentService;
pub use profile::ProfileService;
pub use statistics::StatisticsService;

use crate::client::{HttpClient, HttpImageSource};
use crate::config::ClientConfig;
use crate::models::UserSort;
use catalog_cache::{ImageCache, ImageLoader, KeyedCache, Result};
use std::sync::Arc;
use tracing::info;

/// Image loader over HTTP
pub type HttpImageLoader = ImageLoader<HttpImageSource>;

/// Composition root for the client services
pub struct ServicesAssembly {
    config: ClientConfig,
    client: HttpClient,
    nft_service: NftService,
    image_loader: Arc<HttpImageLoader>,
}

impl ServicesAssembly {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = HttpClient::new(&config)?;

        let nft_service = NftService::new(
            client.clone(),
            KeyedCache::with_config(&config.cache),
            &config.cache,
        );
        let image_loader = Arc::new(ImageLoader::new(
            HttpImageSource::new(client.clone()),
            ImageCache::with_config(&config.cache),
        ));

        info!(
            "Services assembled (image capacity {}, fan-out {})",
            config.cache.image_capacity,
            config
                .cache
                .max_concurrency
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        );

        Ok(Self {
            config,
            client,
            nft_service,
            image_loader,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The NFT service; every call returns a handle onto the same cache
    pub fn nft_service(&self) -> NftService {
        self.nft_service.clone()
    }

    pub fn cart_service(&self) -> CartService {
        CartService::new(self.client.clone(), self.nft_service())
    }

    pub fn payment_service(&self) -> PaymentService {
        PaymentService::new(self.client.clone())
    }

    pub fn profile_service(&self) -> ProfileService {
        ProfileService::new(self.client.clone(), self.nft_service())
    }

    /// A fresh leaderboard starting at page 0
    pub fn statistics_service(&self, sort: UserSort) -> StatisticsService {
        StatisticsService::new(self.client.clone(), sort)
    }

    pub fn image_loader(&self) -> Arc<HttpImageLoader> {
        Arc::clone(&self.image_loader)
    }
}
