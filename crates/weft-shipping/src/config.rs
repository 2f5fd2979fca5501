//! Courier credentials and endpoint.

use crate::error::ShippingError;

/// Connection settings for the logistics API.
#[derive(Debug, Clone)]
pub struct CourierConfig {
    /// Account email, used for `POST /auth/login`.
    pub email: String,
    /// Account password.
    pub password: String,
    /// API base URL, e.g. `https://api.courier.example/v1/external`.
    pub base_url: String,
}

impl CourierConfig {
    /// Build a config, rejecting blank credentials up front.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ShippingError> {
        let email = email.into();
        let password = password.into();
        let base_url = base_url.into();

        if email.trim().is_empty() || password.trim().is_empty() {
            return Err(ShippingError::ConfigError(
                "courier email and password are required".to_string(),
            ));
        }
        if base_url.trim().is_empty() {
            return Err(ShippingError::ConfigError(
                "courier base url is required".to_string(),
            ));
        }

        Ok(Self {
            email,
            password,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}
