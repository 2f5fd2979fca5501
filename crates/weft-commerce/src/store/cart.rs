//! Cart repository.
//!
//! A cart belongs to exactly one identity. For authenticated users the row
//! is keyed by `user_id`; for guests it is keyed by the session token with a
//! NULL `user_id`. Mutations load the cart, apply the domain operation, and
//! write the lines back in one transaction.

use crate::cart::Cart;
use crate::cart::CartItem;
use crate::error::CommerceError;
use crate::ids::{CartId, LineItemId, ProductId, UserId, VariantId};
use crate::money::{Currency, Money};
use serde::Deserialize;
use weft_db::{params, Db};

/// Persistence for carts and their lines.
pub struct CartStore {
    db: Db,
}

impl CartStore {
    /// Open over the default database.
    pub fn open_default() -> Result<Self, CommerceError> {
        Ok(Self {
            db: Db::open_default()?,
        })
    }

    /// Wrap an already-open database handle.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Load the cart for an identity, if one exists.
    pub fn find(
        &self,
        session_id: &str,
        user_id: Option<&UserId>,
    ) -> Result<Option<Cart>, CommerceError> {
        let row: Option<CartRow> = match user_id {
            Some(uid) => self.db.query_optional(
                "SELECT id, session_id, user_id, currency, created_at, updated_at
                 FROM carts WHERE user_id = ?",
                params![uid.as_str()],
            )?,
            None => self.db.query_optional(
                "SELECT id, session_id, user_id, currency, created_at, updated_at
                 FROM carts WHERE session_id = ? AND user_id IS NULL",
                params![session_id],
            )?,
        };
        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.items_for(&CartId::new(row.id.clone()))?;
        Ok(Some(row.into_cart(items)))
    }

    /// Load the cart for an identity, creating an empty one if absent.
    pub fn get_or_create(
        &self,
        session_id: &str,
        user_id: Option<&UserId>,
    ) -> Result<Cart, CommerceError> {
        if let Some(cart) = self.find(session_id, user_id)? {
            return Ok(cart);
        }

        let cart = match user_id {
            Some(uid) => Cart::for_user(uid.clone(), session_id),
            None => Cart::new(session_id),
        };
        self.db.execute(
            "INSERT INTO carts (id, session_id, user_id, currency, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                cart.id.as_str(),
                cart.session_id.as_str(),
                cart.user_id.as_ref().map(|u| u.as_str().to_string()),
                cart.currency.code(),
                cart.created_at,
                cart.updated_at
            ],
        )?;
        Ok(cart)
    }

    /// Add a product (or variant) to the identity's cart.
    ///
    /// Validates that the product is published and that the resulting line
    /// quantity fits the available stock. The unit price is snapshotted from
    /// the catalog at this moment.
    pub fn add(
        &self,
        session_id: &str,
        user_id: Option<&UserId>,
        product_id: &ProductId,
        variant_id: Option<&VariantId>,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        let product = self
            .product_for_cart(product_id)?
            .ok_or_else(|| CommerceError::ProductNotFound(product_id.to_string()))?;
        if product.status != "published" {
            return Err(CommerceError::ProductUnavailable(product_id.to_string()));
        }

        let (line_name, unit_price, available) = match variant_id {
            Some(vid) => {
                let variant = self
                    .variant_for_cart(product_id, vid)?
                    .ok_or_else(|| CommerceError::VariantNotFound(vid.to_string()))?;
                let price = Money::new(
                    variant.price,
                    Currency::from_code(&variant.currency).unwrap_or_default(),
                );
                (
                    format!("{} - {}", product.name, variant.name),
                    price,
                    variant.stock_quantity,
                )
            }
            None => {
                let price = Money::new(
                    product.price,
                    Currency::from_code(&product.currency).unwrap_or_default(),
                );
                (product.name.clone(), price, product.stock_quantity)
            }
        };

        let mut cart = self.get_or_create(session_id, user_id)?;

        let existing = cart
            .items
            .iter()
            .find(|i| &i.product_id == product_id && i.variant_id.as_ref() == variant_id)
            .map(|i| i.quantity)
            .unwrap_or(0);
        let requested = existing.saturating_add(quantity.max(0));
        if requested > available {
            return Err(CommerceError::InsufficientStock {
                product_id: product_id.to_string(),
                requested,
                available,
            });
        }

        cart.add_item(
            product_id.clone(),
            variant_id.cloned(),
            line_name,
            quantity,
            unit_price,
        )?;
        self.save(&cart)?;
        Ok(cart)
    }

    /// Change a line's quantity. A quantity ≤ 0 removes the line.
    ///
    /// Stock is checked when lines are added, not here; lowering or raising
    /// an existing line does not re-read the catalog.
    pub fn update_quantity(
        &self,
        session_id: &str,
        user_id: Option<&UserId>,
        line_item_id: &LineItemId,
        quantity: i64,
    ) -> Result<Cart, CommerceError> {
        let mut cart = self
            .find(session_id, user_id)?
            .ok_or_else(|| CommerceError::CartNotFound(session_id.to_string()))?;
        if !cart.update_quantity(line_item_id, quantity)? {
            return Err(CommerceError::ItemNotInCart(line_item_id.to_string()));
        }
        self.save(&cart)?;
        Ok(cart)
    }

    /// Remove a line from the identity's cart.
    pub fn remove(
        &self,
        session_id: &str,
        user_id: Option<&UserId>,
        line_item_id: &LineItemId,
    ) -> Result<Cart, CommerceError> {
        let mut cart = self
            .find(session_id, user_id)?
            .ok_or_else(|| CommerceError::CartNotFound(session_id.to_string()))?;
        if !cart.remove_item(line_item_id) {
            return Err(CommerceError::ItemNotInCart(line_item_id.to_string()));
        }
        self.save(&cart)?;
        Ok(cart)
    }

    /// Drop the identity's cart and all its lines.
    pub fn clear(&self, session_id: &str, user_id: Option<&UserId>) -> Result<(), CommerceError> {
        let Some(cart) = self.find(session_id, user_id)? else {
            return Ok(());
        };
        self.db.transaction(|tx| {
            tx.execute(
                "DELETE FROM cart_items WHERE cart_id = ?",
                params![cart.id.as_str()],
            )?;
            tx.execute("DELETE FROM carts WHERE id = ?", params![cart.id.as_str()])?;
            Ok(())
        })?;
        Ok(())
    }

    /// Fold a guest cart into the user's cart at login.
    ///
    /// If the user has no cart yet the guest cart is simply claimed.
    /// Otherwise matching lines are merged (quantities capped, not rejected)
    /// and the guest cart is deleted.
    pub fn merge_on_login(
        &self,
        session_id: &str,
        user_id: &UserId,
    ) -> Result<Option<Cart>, CommerceError> {
        let guest = self.find(session_id, None)?;
        let owned = self.find(session_id, Some(user_id))?;

        match (guest, owned) {
            (None, owned) => Ok(owned),
            (Some(mut guest), None) => {
                guest.set_user(user_id.clone());
                self.save(&guest)?;
                Ok(Some(guest))
            }
            (Some(guest), Some(mut owned)) => {
                let guest_id = guest.id.clone();
                owned.merge(guest)?;
                owned.session_id = session_id.to_string();
                self.db.transaction(|tx| {
                    tx.execute(
                        "DELETE FROM cart_items WHERE cart_id = ?",
                        params![guest_id.as_str()],
                    )?;
                    tx.execute("DELETE FROM carts WHERE id = ?", params![guest_id.as_str()])?;
                    Ok(())
                })?;
                self.save(&owned)?;
                Ok(Some(owned))
            }
        }
    }

    /// Write a cart and its lines back. Lines are replaced wholesale, which
    /// keeps the write path independent of which domain mutation ran.
    fn save(&self, cart: &Cart) -> Result<(), CommerceError> {
        self.db.transaction(|tx| {
            tx.execute(
                "UPDATE carts SET session_id = ?, user_id = ?, updated_at = ? WHERE id = ?",
                params![
                    cart.session_id.as_str(),
                    cart.user_id.as_ref().map(|u| u.as_str().to_string()),
                    cart.updated_at,
                    cart.id.as_str()
                ],
            )?;
            tx.execute(
                "DELETE FROM cart_items WHERE cart_id = ?",
                params![cart.id.as_str()],
            )?;
            for item in &cart.items {
                tx.execute(
                    "INSERT INTO cart_items (id, cart_id, product_id, variant_id, product_name,
                                             quantity, unit_price, total_price)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        item.id.as_str(),
                        cart.id.as_str(),
                        item.product_id.as_str(),
                        item.variant_id.as_ref().map(|v| v.as_str().to_string()),
                        item.product_name.as_str(),
                        item.quantity,
                        item.unit_price.subunits,
                        item.total_price.subunits
                    ],
                )?;
            }
            Ok(())
        })?;
        Ok(())
    }

    fn items_for(&self, cart_id: &CartId) -> Result<Vec<CartItem>, CommerceError> {
        let rows: Vec<CartItemRow> = self.db.query_as(
            "SELECT ci.id, ci.product_id, ci.variant_id, ci.product_name, ci.quantity,
                    ci.unit_price, ci.total_price, c.currency
             FROM cart_items ci JOIN carts c ON c.id = ci.cart_id
             WHERE ci.cart_id = ? ORDER BY ci.rowid",
            params![cart_id.as_str()],
        )?;
        Ok(rows.into_iter().map(CartItemRow::into_item).collect())
    }

    fn product_for_cart(
        &self,
        product_id: &ProductId,
    ) -> Result<Option<CartProductRow>, CommerceError> {
        let row = self.db.query_optional(
            "SELECT name, status, price, currency, stock_quantity
             FROM products WHERE id = ?",
            params![product_id.as_str()],
        )?;
        Ok(row)
    }

    fn variant_for_cart(
        &self,
        product_id: &ProductId,
        variant_id: &VariantId,
    ) -> Result<Option<CartVariantRow>, CommerceError> {
        let row = self.db.query_optional(
            "SELECT name, price, currency, stock_quantity
             FROM product_variants WHERE id = ? AND product_id = ?",
            params![variant_id.as_str(), product_id.as_str()],
        )?;
        Ok(row)
    }
}

#[derive(Debug, Deserialize)]
struct CartRow {
    id: String,
    session_id: String,
    user_id: Option<String>,
    currency: String,
    created_at: i64,
    updated_at: i64,
}

impl CartRow {
    fn into_cart(self, items: Vec<CartItem>) -> Cart {
        Cart {
            id: CartId::new(self.id),
            session_id: self.session_id,
            user_id: self.user_id.map(UserId::new),
            items,
            currency: Currency::from_code(&self.currency).unwrap_or_default(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CartItemRow {
    id: String,
    product_id: String,
    variant_id: Option<String>,
    product_name: String,
    quantity: i64,
    unit_price: i64,
    total_price: i64,
    currency: String,
}

impl CartItemRow {
    fn into_item(self) -> CartItem {
        let currency = Currency::from_code(&self.currency).unwrap_or_default();
        CartItem {
            id: LineItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            variant_id: self.variant_id.map(VariantId::new),
            product_name: self.product_name,
            quantity: self.quantity,
            unit_price: Money::new(self.unit_price, currency),
            total_price: Money::new(self.total_price, currency),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CartProductRow {
    name: String,
    status: String,
    price: i64,
    currency: String,
    stock_quantity: i64,
}

#[derive(Debug, Deserialize)]
struct CartVariantRow {
    name: String,
    price: i64,
    currency: String,
    stock_quantity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Host-side queries return no rows, so these cover the absent paths.

    #[test]
    fn test_add_unknown_product() {
        let store = CartStore::open_default().unwrap();
        let result = store.add("sess_abc", None, &ProductId::new("prod_missing"), None, 1);
        assert!(matches!(result, Err(CommerceError::ProductNotFound(_))));
    }

    #[test]
    fn test_update_without_cart() {
        let store = CartStore::open_default().unwrap();
        let result = store.update_quantity("sess_abc", None, &LineItemId::new("item_x"), 2);
        assert!(matches!(result, Err(CommerceError::CartNotFound(_))));
    }

    #[test]
    fn test_clear_without_cart_is_noop() {
        let store = CartStore::open_default().unwrap();
        assert!(store.clear("sess_abc", None).is_ok());
    }

    #[test]
    fn test_cart_row_conversion() {
        let row = CartRow {
            id: "cart_1".to_string(),
            session_id: "sess_abc".to_string(),
            user_id: Some("user_1".to_string()),
            currency: "INR".to_string(),
            created_at: 10,
            updated_at: 20,
        };
        let cart = row.into_cart(Vec::new());
        assert_eq!(cart.user_id.as_ref().map(|u| u.as_str()), Some("user_1"));
        assert_eq!(cart.currency, Currency::INR);
        assert!(cart.is_empty());
    }
}
