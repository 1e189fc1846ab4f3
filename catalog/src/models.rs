//! Marketplace data model
//!
//! Plain serde types mirroring the JSON bodies of the REST API.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single NFT listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nft {
    pub id: String,
    pub name: String,
    /// Image URLs, first one is the preview
    pub images: Vec<String>,
    pub rating: i32,
    pub description: String,
    pub price: f64,
    pub author: String,
}

impl Nft {
    pub fn preview_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftCollection {
    pub id: String,
    pub name: String,
    pub cover: String,
    /// Ids of the NFTs in this collection
    pub nfts: Vec<String>,
    pub description: String,
    pub author: String,
}

/// Leaderboard entry
///
/// Every field but `id` may be absent in API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub nfts: Vec<String>,
    #[serde(default)]
    pub rating: Option<String>,
}

impl User {
    pub fn nft_count(&self) -> usize {
        self.nfts.len()
    }
}

/// A cart: the order id and the NFT ids in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub nfts: Vec<String>,
}

impl Order {
    pub fn is_empty(&self) -> bool {
        self.nfts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub nfts: Vec<String>,
    #[serde(default)]
    pub likes: Vec<String>,
}

impl Profile {
    pub fn likes(&self, nft_id: &str) -> bool {
        self.likes.iter().any(|id| id == nft_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: String,
    pub title: String,
    pub name: String,
    /// Icon URL
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub order_id: String,
    pub id: String,
}

/// Ordering applied to the collection listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSort {
    /// Keep the order the API returned
    #[default]
    None,
    ByName,
    /// Largest collections first
    ByNftCount,
}

impl CollectionSort {
    pub fn apply(self, collections: &mut [NftCollection]) {
        match self {
            CollectionSort::None => {}
            CollectionSort::ByName => collections.sort_by(|a, b| a.name.cmp(&b.name)),
            CollectionSort::ByNftCount => {
                collections.sort_by(|a, b| b.nfts.len().cmp(&a.nfts.len()))
            }
        }
    }
}

/// Ordering applied to the leaderboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserSort {
    /// Alphabetical, ignoring surrounding whitespace; unnamed users sort first
    ByName,
    /// Most NFTs owned first
    #[default]
    ByNftCount,
}

impl UserSort {
    pub fn compare(self, a: &User, b: &User) -> Ordering {
        match self {
            UserSort::ByName => display_name(a).cmp(display_name(b)),
            UserSort::ByNftCount => b.nft_count().cmp(&a.nft_count()),
        }
    }
}

fn display_name(user: &User) -> &str {
    user.name.as_deref().unwrap_or_default().trim()
}
