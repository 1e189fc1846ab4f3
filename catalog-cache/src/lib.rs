//! # Catalog Cache (catalog-cache)
//!
//! Keyed fetch-and-cache orchestration for a catalog client.
//!
//! ## Features
//!
//! - Concurrent-safe in-memory caches (unbounded and LRU-bounded)
//! - Batch fetching with cache partition, one task per missing key and a
//!   counting fan-in
//! - Partial successes are cached even when a batch reports failure
//! - Optional ceiling on concurrent retrievals
//! - Decoded-image cache keyed by resource locator
//! - Paginated list accumulation with in-flight de-duplication
//!
//! ## Batch fetching
//!
//! ```no_run
//! use catalog_cache::{fetcher_fn, BatchFetchOrchestrator, FetchError};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = fetcher_fn(|id: String| async move {
//!         // network call + decode
//!         Ok::<_, FetchError>(format!("entity {}", id))
//!     });
//!     let orchestrator = BatchFetchOrchestrator::new(fetcher);
//!
//!     match orchestrator.fetch_all(["a", "b", "c"]).await {
//!         Ok(values) => println!("Fetched {} values", values.len()),
//!         Err(failure) => {
//!             // Successful keys are cached; retrying re-fetches only failures
//!             println!("{} failed: {}", failure.failure_count, failure.first_error);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pagination
//!
//! ```no_run
//! use catalog_cache::{page_fetcher_fn, FetchError, PaginatedAccumulator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pager = PaginatedAccumulator::new(page_fetcher_fn(|page: u32| async move {
//!         Ok::<_, FetchError>(vec![page])
//!     }));
//!
//!     if let Some(page) = pager.fetch_next_page().await? {
//!         println!("Page {} brought {} items", page.cursor, page.items.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod cache;
pub mod error;
pub mod fetch;
pub mod image_cache;
pub mod paging;

// Re-export main types for convenience
pub use batch::{BatchFetchOrchestrator, FetchOutcome, OrchestratorStats};
pub use cache::{
    BoundedCache, CacheConfig, CacheConfigBuilder, CacheEntry, CacheMetadata, CacheStats,
    Identifier, KeyedCache,
};
pub use error::{BatchFailure, BatchResult, FetchError, Result};
pub use fetch::{
    fetcher_fn, page_fetcher_fn, FnFetcher, FnPageFetcher, ImageSource, PageFetcher,
    RemoteFetcher,
};
pub use image_cache::{DecodedImage, ImageCache, ImageLoader};
pub use paging::{Page, PaginatedAccumulator};
