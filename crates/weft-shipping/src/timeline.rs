//! Tracking data and the synthesized fallback timeline.
//!
//! Tracking must never surface a hard error to the customer. When the
//! courier API is down, or the order has no AWB yet, the order's own
//! status and timestamps are turned into a degraded but self-consistent
//! timeline.

use serde::{Deserialize, Serialize};
use weft_commerce::checkout::{Order, OrderStatus};

/// A single step in a shipment's history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingEvent {
    /// Short status code, e.g. `shipped`.
    pub status: String,
    /// Human-readable activity text.
    pub description: String,
    /// Where the event happened, when the courier reports it.
    pub location: Option<String>,
    /// Unix timestamp for synthesized events.
    pub timestamp: Option<i64>,
    /// Courier-formatted date string for live events.
    pub date: Option<String>,
}

/// Shipment history for one order, live or synthesized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingData {
    /// Courier AWB code, when assigned.
    pub tracking_number: Option<String>,
    /// Current shipment or order status.
    pub current_status: String,
    /// Courier company, when known.
    pub courier_name: Option<String>,
    /// Courier's delivery estimate, when given.
    pub estimated_delivery: Option<String>,
    /// True when the timeline was derived locally rather than fetched.
    pub synthesized: bool,
    /// Oldest first.
    pub events: Vec<TrackingEvent>,
}

const FORWARD_STAGES: [(&str, &str); 5] = [
    ("placed", "Order placed"),
    ("confirmed", "Payment confirmed"),
    ("processing", "Order is being prepared"),
    ("shipped", "Handed to the courier"),
    ("delivered", "Delivered"),
];

/// Timeline for an order that has not been handed to the courier yet.
pub fn awaiting_shipment(order: &Order) -> TrackingData {
    TrackingData {
        tracking_number: None,
        current_status: order.status.as_str().to_string(),
        courier_name: None,
        estimated_delivery: None,
        synthesized: true,
        events: vec![synthesized_event(
            "awaiting_shipment",
            "Awaiting shipment. Tracking will be available once the order is dispatched.",
            order.updated_at,
        )],
    }
}

/// Derive a timeline from the order's own status and timestamps.
///
/// Only the latest transition time is recorded on the order, so
/// intermediate stages inherit the nearest known timestamp. The result is
/// non-decreasing in time.
pub fn fallback_timeline(order: &Order) -> TrackingData {
    let confirmed_at = order.paid_at.unwrap_or(order.created_at);
    let mut events = Vec::new();

    match order.status {
        OrderStatus::Cancelled => {
            events.push(synthesized_event("placed", "Order placed", order.created_at));
            if order.paid_at.is_some() {
                events.push(synthesized_event(
                    "confirmed",
                    "Payment confirmed",
                    confirmed_at,
                ));
            }
            events.push(synthesized_event(
                "cancelled",
                "Order cancelled",
                order.cancelled_at.unwrap_or(order.updated_at),
            ));
        }
        OrderStatus::Refunded => {
            events.push(synthesized_event("placed", "Order placed", order.created_at));
            events.push(synthesized_event(
                "confirmed",
                "Payment confirmed",
                confirmed_at,
            ));
            events.push(synthesized_event(
                "refunded",
                "Payment refunded",
                order.updated_at,
            ));
        }
        _ => {
            let reached = match order.status {
                OrderStatus::Pending => 1,
                OrderStatus::Paid => 2,
                OrderStatus::Processing => 3,
                OrderStatus::Shipped => 4,
                _ => 5,
            };
            for (i, (status, description)) in FORWARD_STAGES.iter().take(reached).enumerate() {
                let ts = match i {
                    0 => order.created_at,
                    i if i == reached - 1 => order.updated_at,
                    _ => confirmed_at,
                };
                events.push(synthesized_event(status, description, ts));
            }
        }
    }

    TrackingData {
        tracking_number: order.tracking_number.clone(),
        current_status: order.status.as_str().to_string(),
        courier_name: None,
        estimated_delivery: None,
        synthesized: true,
        events,
    }
}

fn synthesized_event(status: &str, description: &str, timestamp: i64) -> TrackingEvent {
    TrackingEvent {
        status: status.to_string(),
        description: description.to_string(),
        location: None,
        timestamp: Some(timestamp),
        date: None,
    }
}
