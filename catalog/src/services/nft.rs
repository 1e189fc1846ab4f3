//! NFT lookups and the collection listing

use crate::client::{HttpClient, NftFetcher};
use crate::models::{CollectionSort, Nft, NftCollection};
use catalog_cache::{
    BatchFetchOrchestrator, BatchResult, CacheConfig, Identifier, KeyedCache, OrchestratorStats,
    Result,
};
use std::sync::Arc;
use tracing::{debug, info};

/// NFT service
///
/// All NFT lookups go through one orchestrator over the shared NFT cache, so
/// an NFT fetched for the cart is a cache hit for every later lookup.
#[derive(Clone)]
pub struct NftService {
    client: HttpClient,
    orchestrator: Arc<BatchFetchOrchestrator<Nft, NftFetcher>>,
}

impl NftService {
    pub fn new(client: HttpClient, cache: KeyedCache<Identifier, Nft>, config: &CacheConfig) -> Self {
        let fetcher = NftFetcher::new(client.clone());
        Self {
            client,
            orchestrator: Arc::new(BatchFetchOrchestrator::with_cache(cache, fetcher, config)),
        }
    }

    /// Load one NFT, from cache when present
    pub async fn load_nft(&self, id: &str) -> Result<Nft> {
        self.orchestrator.fetch_one(id).await
    }

    /// Load every NFT in `ids`
    ///
    /// The result is unordered and has one entry per distinct id. If any
    /// lookup fails the whole call fails, but the NFTs that did load stay
    /// cached, so calling again only re-fetches the failures.
    pub async fn fetch_nfts<I, S>(&self, ids: I) -> BatchResult<Nft>
    where
        I: IntoIterator<Item = S>,
        S: Into<Identifier>,
    {
        self.orchestrator.fetch_all(ids).await
    }

    /// Fetch all collections, ordered by `sort`
    ///
    /// Collections are not cached.
    pub async fn fetch_collections(&self, sort: CollectionSort) -> Result<Vec<NftCollection>> {
        let mut collections: Vec<NftCollection> = self.client.get_json("collections").await?;
        debug!("Fetched {} collections", collections.len());

        sort.apply(&mut collections);
        info!("Loaded {} collections ({:?})", collections.len(), sort);
        Ok(collections)
    }

    pub fn cache(&self) -> &KeyedCache<Identifier, Nft> {
        self.orchestrator.cache()
    }

    pub fn stats(&self) -> OrchestratorStats {
        self.orchestrator.stats()
    }
}
