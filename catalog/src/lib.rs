//! # Catalog
//!
//! Client for an NFT marketplace REST API, built on `catalog-cache`.
//!
//! - NFT lookups batched through a shared, concurrent-safe cache
//! - Cart, payment and profile operations
//! - A paged leaderboard ranked by name or by owned NFTs
//! - Decoded-image loading with a bounded cache
//!
//! ```no_run
//! use catalog::{ClientConfig, ServicesAssembly};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let services = ServicesAssembly::new(ClientConfig::from_env()?)?;
//!
//!     let cart = services.cart_service().load_cart_items("1").await?;
//!     println!("{} NFTs in the cart", cart.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod models;
pub mod services;

pub use client::{HttpClient, HttpImageSource, NftFetcher, UsersPageFetcher};
pub use config::ClientConfig;
pub use models::{
    CollectionSort, Currency, Nft, NftCollection, Order, PaymentResponse, Profile, User,
    UserSort,
};
pub use services::{
    CartService, HttpImageLoader, NftService, PaymentService, ProfileService, ServicesAssembly,
    StatisticsService,
};
