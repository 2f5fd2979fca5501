//! Commerce error types.

use thiserror::Error;

/// Errors that can occur in commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Variant not found.
    #[error("Variant not found: {0}")]
    VariantNotFound(String),

    /// Category not found.
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Product exists but cannot be ordered (draft or archived).
    #[error("Product not available: {0}")]
    ProductUnavailable(String),

    /// Cart not found.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Item not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Requested quantity exceeds available stock.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Quantity exceeds maximum allowed per line.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Order status walk violated.
    #[error("Invalid order transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// Operation requires a pending order.
    #[error("Order already processed: {0}")]
    OrderAlreadyProcessed(String),

    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// True for errors that mean "the referenced thing does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CommerceError::ProductNotFound(_)
                | CommerceError::VariantNotFound(_)
                | CommerceError::CategoryNotFound(_)
                | CommerceError::CartNotFound(_)
                | CommerceError::OrderNotFound(_)
                | CommerceError::ItemNotInCart(_)
        )
    }

    /// True for conflicts with current state rather than bad input.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CommerceError::OrderAlreadyProcessed(_) | CommerceError::InvalidStatusTransition { .. }
        )
    }
}

impl From<weft_db::DbError> for CommerceError {
    fn from(e: weft_db::DbError) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
