//! Shopping cart backed by an order

use crate::client::HttpClient;
use crate::models::{Nft, Order};
use crate::services::nft::NftService;
use catalog_cache::{FetchError, Result};
use tracing::{debug, info};

#[derive(Clone)]
pub struct CartService {
    client: HttpClient,
    nfts: NftService,
}

impl CartService {
    pub fn new(client: HttpClient, nfts: NftService) -> Self {
        Self { client, nfts }
    }

    pub async fn load_order(&self, order_id: &str) -> Result<Order> {
        self.client.get_json(&order_path(order_id)).await
    }

    /// Load the NFTs in the cart
    ///
    /// An empty order yields an empty list without any NFT lookup. A failed
    /// NFT lookup fails the call with the first error observed.
    pub async fn load_cart_items(&self, order_id: &str) -> Result<Vec<Nft>> {
        let order = self.load_order(order_id).await?;
        if order.is_empty() {
            info!("Order {} is empty", order_id);
            return Ok(Vec::new());
        }

        debug!("Order {} holds {} NFTs", order_id, order.nfts.len());
        self.nfts
            .fetch_nfts(order.nfts)
            .await
            .map_err(|failure| failure.first_error)
    }

    /// Remove one NFT from the cart and store the remaining ids
    ///
    /// Returns the order as the API stored it.
    pub async fn delete_cart_item(&self, order_id: &str, item_id: &str) -> Result<Order> {
        let order = self.load_order(order_id).await?;
        if !order.nfts.iter().any(|id| id == item_id) {
            return Err(FetchError::NotFound(format!(
                "{} is not in order {}",
                item_id, order_id
            )));
        }

        let remaining: Vec<String> = order.nfts.into_iter().filter(|id| id != item_id).collect();
        let updated: Order = self
            .client
            .put_form(&order_path(order_id), &id_list_form("nfts", &remaining))
            .await?;

        info!(
            "Removed {} from order {} ({} left)",
            item_id,
            order_id,
            updated.nfts.len()
        );
        Ok(updated)
    }
}

fn order_path(order_id: &str) -> String {
    format!("orders/{}", order_id)
}

/// Form body for a comma-joined id list; an empty list sends no field at all
pub(crate) fn id_list_form(field: &'static str, ids: &[String]) -> Vec<(&'static str, String)> {
    if ids.is_empty() {
        Vec::new()
    } else {
        vec![(field, ids.join(","))]
    }
}
