//! Payment gateway adapter for the Weft storefront.
//!
//! Implements the two-phase hosted-checkout handshake:
//!
//! 1. **Create intent**: mint a remote order on the gateway
//!    ([`GatewayClient::create_order`]) after checking the amount against
//!    the local order ([`validate_amount`]).
//! 2. **Verify**: recompute the HMAC-SHA256 signature over
//!    `remote_order_id|payment_id` and compare against the client's copy
//!    ([`verify_signature`]).
//!
//! What the client asserts is never trusted; the secret never leaves the
//! server.

mod config;
mod error;
mod gateway;
mod verify;

pub use config::GatewayConfig;
pub use error::PaymentError;
pub use gateway::{GatewayClient, RemoteOrder};
pub use verify::{validate_amount, verify_signature, AMOUNT_TOLERANCE, MAX_ORDER_AMOUNT};
