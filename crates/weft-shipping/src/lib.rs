//! Courier tracking adapter for the Weft storefront.
//!
//! Wraps the logistics API with cached bearer-token auth
//! ([`CourierClient`]) and provides the synthesized fallback timelines
//! ([`fallback_timeline`], [`awaiting_shipment`]) used when the courier is
//! unreachable or the order has no AWB yet. Tracking is best-effort by
//! contract: callers degrade to a local timeline instead of erroring.

mod client;
mod config;
mod error;
mod timeline;

pub use client::CourierClient;
pub use config::CourierConfig;
pub use error::ShippingError;
pub use timeline::{awaiting_shipment, fallback_timeline, TrackingData, TrackingEvent};
