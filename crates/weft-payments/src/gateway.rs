//! Remote order creation against the hosted-checkout gateway.

use crate::config::GatewayConfig;
use crate::error::PaymentError;
use serde::{Deserialize, Serialize};
use weft_commerce::Money;
use weft_data::FetchClient;

/// An order minted on the gateway side. Its `id` is what the hosted
/// checkout widget binds the payment to, and what the signature later
/// covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteOrder {
    /// Gateway order id.
    pub id: String,
    /// Amount in currency subunits.
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
    /// Our order number, echoed back.
    pub receipt: Option<String>,
    /// Gateway-side status, `created` on success.
    pub status: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    amount: i64,
    currency: String,
    receipt: String,
}

/// Client for the payment gateway API.
pub struct GatewayClient {
    config: GatewayConfig,
    http: FetchClient,
}

impl GatewayClient {
    /// Build a client from validated config.
    pub fn new(config: GatewayConfig) -> Self {
        let http = FetchClient::new().with_base_url(config.base_url.clone());
        Self { config, http }
    }

    /// The configured key id, exposed so handlers can hand it to the
    /// checkout widget.
    pub fn key_id(&self) -> &str {
        &self.config.key_id
    }

    /// HMAC key for signature verification.
    pub fn key_secret(&self) -> &str {
        &self.config.key_secret
    }

    /// Mint a remote order for the given amount.
    ///
    /// The gateway expects the amount in subunits; `Money` already carries
    /// paisa, so the value goes through untouched. `receipt` is our order
    /// number for reconciliation.
    pub async fn create_order(
        &self,
        amount: Money,
        receipt: &str,
    ) -> Result<RemoteOrder, PaymentError> {
        let request = CreateOrderRequest {
            amount: amount.subunits,
            currency: amount.currency.code().to_string(),
            receipt: receipt.to_string(),
        };

        let response = self
            .http
            .post("/orders")
            .basic_auth(&self.config.key_id, Some(self.config.key_secret.as_str()))
            .json(&request)?
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_order_deserializes_gateway_payload() {
        let body = r#"{
            "id": "order_Nxq3pFo7a2bc1d",
            "amount": 269500,
            "currency": "INR",
            "receipt": "ORD-1700000000",
            "status": "created",
            "attempts": 0
        }"#;
        let remote: RemoteOrder = serde_json::from_str(body).unwrap();
        assert_eq!(remote.id, "order_Nxq3pFo7a2bc1d");
        assert_eq!(remote.amount, 269500);
        assert_eq!(remote.status, "created");
    }

    #[test]
    fn test_create_request_serializes_subunits() {
        let request = CreateOrderRequest {
            amount: 269500,
            currency: "INR".to_string(),
            receipt: "ORD-1700000000".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount"], 269500);
        assert_eq!(json["currency"], "INR");
    }
}
