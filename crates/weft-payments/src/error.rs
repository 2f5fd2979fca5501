//! Payment error types.

use thiserror::Error;

/// Errors from the gateway adapter.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Gateway credentials are missing or malformed.
    #[error("Gateway configuration error: {0}")]
    ConfigError(String),

    /// The gateway rejected the request or could not be reached.
    #[error("Gateway error: {0}")]
    GatewayError(String),

    /// Client-supplied signature does not match the server-side HMAC.
    #[error("Payment signature verification failed")]
    VerificationFailed,

    /// Amount is zero, negative, or above the per-order ceiling.
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),

    /// Amount does not match the order total.
    #[error("Payment amount mismatch: expected {expected}, got {got}")]
    AmountMismatch { expected: String, got: String },

    /// Serialization failure on a gateway payload.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<weft_data::FetchError> for PaymentError {
    fn from(e: weft_data::FetchError) -> Self {
        PaymentError::GatewayError(e.to_string())
    }
}

impl From<serde_json::Error> for PaymentError {
    fn from(e: serde_json::Error) -> Self {
        PaymentError::SerializationError(e.to_string())
    }
}
