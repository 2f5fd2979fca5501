//! Cart and cart item types.

use crate::error::CommerceError;
use crate::ids::{CartId, LineItemId, ProductId, UserId, VariantId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Maximum quantity allowed per cart line.
pub const MAX_QUANTITY_PER_ITEM: i64 = 99;

/// A shopping cart.
///
/// A cart is owned by exactly one identity: an authenticated user id, or the
/// anonymous session token in `session_id`. Total and item count are derived
/// from the lines on every read and never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Unique cart identifier.
    pub id: CartId,
    /// Session token for anonymous carts.
    pub session_id: String,
    /// User ID once the owner is authenticated.
    pub user_id: Option<UserId>,
    /// Lines in the cart.
    pub items: Vec<CartItem>,
    /// Cart currency.
    pub currency: Currency,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Cart {
    /// Create a new cart for a session.
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = current_timestamp();
        Self {
            id: CartId::generate(),
            session_id: session_id.into(),
            user_id: None,
            items: Vec::new(),
            currency: Currency::INR,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a cart for an authenticated user.
    pub fn for_user(user_id: UserId, session_id: impl Into<String>) -> Self {
        let mut cart = Self::new(session_id);
        cart.user_id = Some(user_id);
        cart
    }

    /// Add a line, or bump an existing line for the same product+variant.
    ///
    /// The price is snapshotted at add-time; later catalog changes do not
    /// touch existing lines. Errors if quantity is not positive, the line
    /// would exceed MAX_QUANTITY_PER_ITEM, the price is in a different
    /// currency than the cart, or the total overflows.
    pub fn add_item(
        &mut self,
        product_id: ProductId,
        variant_id: Option<VariantId>,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<LineItemId, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }

        // All lines share the cart currency; subtotals rely on it.
        if unit_price.currency != self.currency {
            return Err(CommerceError::CurrencyMismatch {
                expected: self.currency.code().to_string(),
                got: unit_price.currency.code().to_string(),
            });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|i| i.product_id == product_id && i.variant_id == variant_id)
        {
            let new_quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CommerceError::Overflow)?;

            if new_quantity > MAX_QUANTITY_PER_ITEM {
                return Err(CommerceError::QuantityExceedsLimit(
                    new_quantity,
                    MAX_QUANTITY_PER_ITEM,
                ));
            }

            existing.quantity = new_quantity;
            existing.update_total()?;
            self.updated_at = current_timestamp();
            return Ok(existing.id.clone());
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        let item = CartItem::new(product_id, variant_id, product_name, quantity, unit_price)?;
        let id = item.id.clone();
        self.items.push(item);
        self.updated_at = current_timestamp();
        Ok(id)
    }

    /// Update a line's quantity.
    ///
    /// A quantity ≤ 0 removes the line and is not an error. Returns whether
    /// a line was touched.
    pub fn update_quantity(
        &mut self,
        line_item_id: &LineItemId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        if quantity <= 0 {
            return Ok(self.remove_item(line_item_id));
        }

        if quantity > MAX_QUANTITY_PER_ITEM {
            return Err(CommerceError::QuantityExceedsLimit(
                quantity,
                MAX_QUANTITY_PER_ITEM,
            ));
        }

        if let Some(item) = self.items.iter_mut().find(|i| &i.id == line_item_id) {
            item.quantity = quantity;
            item.update_total()?;
            self.updated_at = current_timestamp();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Remove a line from the cart.
    pub fn remove_item(&mut self, line_item_id: &LineItemId) -> bool {
        let len_before = self.items.len();
        self.items.retain(|i| &i.id != line_item_id);
        let removed = self.items.len() < len_before;
        if removed {
            self.updated_at = current_timestamp();
        }
        removed
    }

    /// Clear all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.updated_at = current_timestamp();
    }

    /// Total item count: Σ quantity.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Number of distinct lines.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get a line by ID.
    pub fn get_item(&self, line_item_id: &LineItemId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == line_item_id)
    }

    /// Subtotal: Σ(unit_price × quantity) over the snapshotted prices.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        Money::try_sum(self.items.iter().map(|i| &i.total_price), self.currency)
            .ok_or(CommerceError::Overflow)
    }

    /// Merge another cart into this one (used when a user logs in with an
    /// anonymous cart in hand).
    ///
    /// Quantities for matching lines are added and capped at
    /// MAX_QUANTITY_PER_ITEM rather than rejected.
    pub fn merge(&mut self, other: Cart) -> Result<(), CommerceError> {
        for item in other.items {
            if let Some(existing) = self
                .items
                .iter_mut()
                .find(|i| i.product_id == item.product_id && i.variant_id == item.variant_id)
            {
                existing.quantity = existing
                    .quantity
                    .saturating_add(item.quantity)
                    .min(MAX_QUANTITY_PER_ITEM);
                existing.update_total()?;
            } else {
                self.items.push(item);
            }
        }
        self.updated_at = current_timestamp();
        Ok(())
    }

    /// Claim the cart for an authenticated user.
    pub fn set_user(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
        self.updated_at = current_timestamp();
    }
}

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    /// Unique line identifier.
    pub id: LineItemId,
    /// Product being purchased.
    pub product_id: ProductId,
    /// Variant, when the product has them.
    pub variant_id: Option<VariantId>,
    /// Product name (denormalized for display).
    pub product_name: String,
    /// Quantity, always ≥ 1 while the line exists.
    pub quantity: i64,
    /// Unit price snapshotted at add-time.
    pub unit_price: Money,
    /// Line total (unit_price × quantity).
    pub total_price: Money,
}

impl CartItem {
    /// Create a new cart line.
    pub fn new(
        product_id: ProductId,
        variant_id: Option<VariantId>,
        product_name: impl Into<String>,
        quantity: i64,
        unit_price: Money,
    ) -> Result<Self, CommerceError> {
        let total_price = unit_price
            .try_multiply(quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            id: LineItemId::generate(),
            product_id,
            variant_id,
            product_name: product_name.into(),
            quantity,
            unit_price,
            total_price,
        })
    }

    /// Recompute the line total from the snapshotted unit price.
    pub fn update_total(&mut self) -> Result<(), CommerceError> {
        self.total_price = self
            .unit_price
            .try_multiply(self.quantity)
            .ok_or(CommerceError::Overflow)?;
        Ok(())
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
