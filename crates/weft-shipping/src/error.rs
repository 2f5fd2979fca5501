//! Shipping error types.

use thiserror::Error;

/// Errors from the courier adapter.
#[derive(Error, Debug)]
pub enum ShippingError {
    /// Courier credentials are missing or malformed.
    #[error("Courier configuration error: {0}")]
    ConfigError(String),

    /// Login against the courier API was rejected.
    #[error("Courier authentication failed: HTTP {0}")]
    AuthFailed(u16),

    /// The courier API errored or could not be reached.
    #[error("Courier error: {0}")]
    CourierError(String),

    /// Token cache read/write failure.
    #[error("Token cache error: {0}")]
    StorageError(String),
}

impl From<weft_data::FetchError> for ShippingError {
    fn from(e: weft_data::FetchError) -> Self {
        ShippingError::CourierError(e.to_string())
    }
}

impl From<weft_cache::CacheError> for ShippingError {
    fn from(e: weft_cache::CacheError) -> Self {
        ShippingError::StorageError(e.to_string())
    }
}
