//! Currencies and order payment

use crate::client::HttpClient;
use crate::models::{Currency, PaymentResponse};
use catalog_cache::Result;
use tracing::{info, warn};

#[derive(Clone)]
pub struct PaymentService {
    client: HttpClient,
}

impl PaymentService {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub async fn fetch_currencies(&self) -> Result<Vec<Currency>> {
        self.client.get_json("currencies").await
    }

    pub async fn fetch_currency(&self, currency_id: &str) -> Result<Currency> {
        self.client
            .get_json(&format!("currencies/{}", currency_id))
            .await
    }

    /// Pay for `order_id` in `currency_id`
    ///
    /// A declined payment is still `Ok`; check [`PaymentResponse::success`].
    pub async fn make_payment(&self, order_id: &str, currency_id: &str) -> Result<PaymentResponse> {
        let response: PaymentResponse = self
            .client
            .get_json(&format!("orders/{}/payment/{}", order_id, currency_id))
            .await?;

        if response.success {
            info!("Order {} paid in {}", order_id, currency_id);
        } else {
            warn!("Payment for order {} was declined", order_id);
        }
        Ok(response)
    }
}
