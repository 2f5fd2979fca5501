//! Gateway credentials and endpoint.

use crate::error::PaymentError;

/// Connection settings for the hosted-checkout gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API key id, the Basic-auth username.
    pub key_id: String,
    /// API key secret. Also the HMAC key for signature verification.
    pub key_secret: String,
    /// API base URL, e.g. `https://api.gateway.example/v1`.
    pub base_url: String,
}

impl GatewayConfig {
    /// Build a config, rejecting blank credentials up front.
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, PaymentError> {
        let key_id = key_id.into();
        let key_secret = key_secret.into();
        let base_url = base_url.into();

        if key_id.trim().is_empty() || key_secret.trim().is_empty() {
            return Err(PaymentError::ConfigError(
                "gateway key id and secret are required".to_string(),
            ));
        }
        if base_url.trim().is_empty() {
            return Err(PaymentError::ConfigError(
                "gateway base url is required".to_string(),
            ));
        }

        Ok(Self {
            key_id,
            key_secret,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
