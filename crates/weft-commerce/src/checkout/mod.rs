//! Checkout module.
//!
//! Contains the shared totals calculator, customer snapshots, and orders.

mod customer;
mod order;
mod totals;

pub use customer::{CustomerInfo, Profile};
pub use order::{Order, OrderItem, OrderStatus, PaymentStatus};
pub use totals::{calculate_totals, OrderTotals, PaymentMethod, ShippingMethod, TAX_RATE};
