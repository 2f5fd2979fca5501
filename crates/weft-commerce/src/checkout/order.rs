//! Order types and the status walk.

use crate::cart::CartItem;
use crate::checkout::{CustomerInfo, OrderTotals, PaymentMethod, ShippingMethod};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId, VariantId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// The forward walk is pending → paid → processing → shipped → delivered,
/// with cancelled and refunded as branches. `can_transition_to` is the
/// single source of truth; admin updates go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, payment not yet confirmed.
    #[default]
    Pending,
    /// Payment confirmed.
    Paid,
    /// Being prepared for dispatch.
    Processing,
    /// Handed to the courier.
    Shipped,
    /// Delivered to the customer.
    Delivered,
    /// Cancelled before dispatch.
    Cancelled,
    /// Money returned.
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Paid => "Paid",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "paid" => Some(OrderStatus::Paid),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    /// Check if the order has reached a final state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Check if the order can still be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Paid | OrderStatus::Processing
        )
    }

    /// Check whether a status change is a legal step in the walk.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Processing)
                | (Paid, Cancelled)
                | (Paid, Refunded)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Processing, Refunded)
                | (Shipped, Delivered)
                | (Delivered, Refunded)
        )
    }
}

/// Payment settlement status, tracked separately from fulfilment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Awaiting gateway confirmation (or courier collection).
    #[default]
    Pending,
    /// Settled.
    Completed,
    /// Gateway rejected or verification failed terminally.
    Failed,
    /// Returned to the customer.
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            "refunded" => Some(PaymentStatus::Refunded),
            _ => None,
        }
    }
}

/// A placed order with its immutable line snapshots.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    /// The customer who placed the order. Orders require authentication.
    pub user_id: UserId,
    /// Customer email at placement.
    pub email: String,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Settlement status.
    pub payment_status: PaymentStatus,
    /// How the order is paid.
    pub payment_method: PaymentMethod,
    /// Gateway payment id recorded on successful verification.
    pub payment_reference: Option<String>,
    /// Line snapshots.
    pub items: Vec<OrderItem>,
    /// Customer and shipping snapshot.
    pub customer: CustomerInfo,
    /// Chosen shipping method.
    pub shipping_method: ShippingMethod,
    /// Σ(unit_price × quantity).
    pub subtotal: Money,
    /// Flat fee for the shipping method.
    pub shipping_amount: Money,
    /// round(subtotal × 18%).
    pub tax_amount: Money,
    /// subtotal + shipping + tax.
    pub total_amount: Money,
    /// Order currency.
    pub currency: Currency,
    /// Courier AWB code once dispatched.
    pub tracking_number: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
    /// Unix timestamp when payment settled.
    pub paid_at: Option<i64>,
    /// Unix timestamp when cancelled.
    pub cancelled_at: Option<i64>,
}

impl Order {
    /// Assemble a pending order from checkout inputs.
    pub fn new(
        user_id: UserId,
        customer: CustomerInfo,
        items: Vec<OrderItem>,
        shipping_method: ShippingMethod,
        payment_method: PaymentMethod,
        totals: OrderTotals,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: OrderId::generate(),
            order_number: Self::generate_order_number(),
            user_id,
            email: customer.email.clone(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method,
            payment_reference: None,
            items,
            customer,
            shipping_method,
            subtotal: totals.subtotal,
            shipping_amount: totals.shipping,
            tax_amount: totals.tax,
            total_amount: totals.total,
            currency: totals.total.currency,
            tracking_number: None,
            created_at: now,
            updated_at: now,
            paid_at: None,
            cancelled_at: None,
        }
    }

    /// Generate a new order number.
    pub fn generate_order_number() -> String {
        use std::time::{SystemTime, UNIX_EPOCH};
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("ORD-{}", ts)
    }

    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Check if payment has settled.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Completed
    }

    /// Settle payment, recording the gateway reference when there is one.
    ///
    /// Only a pending order can be marked paid; a second attempt is the
    /// replay case and comes back `OrderAlreadyProcessed` with the stored
    /// reference untouched.
    pub fn mark_paid(&mut self, reference: Option<String>) -> Result<(), CommerceError> {
        if self.status != OrderStatus::Pending {
            return Err(CommerceError::OrderAlreadyProcessed(
                self.order_number.clone(),
            ));
        }
        self.status = OrderStatus::Paid;
        self.payment_status = PaymentStatus::Completed;
        self.payment_reference = reference;
        let now = current_timestamp();
        self.paid_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Move the order along the status walk, rejecting illegal steps.
    pub fn transition_to(&mut self, next: OrderStatus) -> Result<(), CommerceError> {
        if !self.status.can_transition_to(next) {
            return Err(CommerceError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.status = next;
        let now = current_timestamp();
        if next == OrderStatus::Cancelled {
            self.cancelled_at = Some(now);
        }
        if next == OrderStatus::Refunded {
            self.payment_status = PaymentStatus::Refunded;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Cancel the order if it has not shipped.
    pub fn cancel(&mut self) -> Result<(), CommerceError> {
        self.transition_to(OrderStatus::Cancelled)
    }
}

/// An immutable line snapshot on an order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    /// Unique line identifier.
    pub id: OrderItemId,
    /// Product at time of order.
    pub product_id: ProductId,
    /// Variant at time of order.
    pub variant_id: Option<VariantId>,
    /// Product name at time of order.
    pub name: String,
    /// Quantity ordered.
    pub quantity: i64,
    /// Unit price at time of order.
    pub unit_price: Money,
    /// Line total at time of order.
    pub total_price: Money,
}

impl OrderItem {
    /// Snapshot a cart line into an order line.
    pub fn from_cart_item(item: &CartItem) -> Self {
        Self {
            id: OrderItemId::generate(),
            product_id: item.product_id.clone(),
            variant_id: item.variant_id.clone(),
            name: item.product_name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
        }
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
