//! Order repository.
//!
//! Placement is the one multi-table write in the storefront: the order
//! header, its line snapshots, and the cart deletion land in a single
//! transaction so a crash can never leave a half-placed order behind.

use crate::cart::Cart;
use crate::checkout::{
    calculate_totals, CustomerInfo, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
    Profile, ShippingMethod,
};
use crate::error::CommerceError;
use crate::ids::{OrderId, OrderItemId, ProductId, UserId, VariantId};
use crate::money::{Currency, Money};
use serde::Deserialize;
use weft_db::{params, Db};

/// Persistence for orders and their line snapshots.
pub struct OrderStore {
    db: Db,
}

impl OrderStore {
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

    /// Place an order from the user's cart.
    ///
    /// Validates the customer snapshot, prices the cart, and writes the
    /// order atomically with the cart deletion. Cash-on-delivery orders are
    /// settled at placement, so the written row is already paid.
    pub fn create(
        &self,
        user_id: &UserId,
        cart: &Cart,
        customer: CustomerInfo,
        shipping_method: ShippingMethod,
        payment_method: PaymentMethod,
    ) -> Result<Order, CommerceError> {
        customer.validate()?;
        if cart.is_empty() {
            return Err(CommerceError::ValidationError("cart is empty".to_string()));
        }

        let subtotal = cart.subtotal()?;
        let totals = calculate_totals(subtotal, shipping_method)?;
        let items: Vec<OrderItem> = cart.items.iter().map(OrderItem::from_cart_item).collect();

        let mut order = Order::new(
            user_id.clone(),
            customer,
            items,
            shipping_method,
            payment_method,
            totals,
        );
        if payment_method.is_cash_on_delivery() {
            // A freshly assembled order is always pending, so this cannot
            // hit the replay guard.
            order.mark_paid(None)?;
        }

        let customer_json = serde_json::to_string(&order.customer)?;

        self.db.transaction(|tx| {
            tx.execute(
                "INSERT INTO orders (id, order_number, user_id, email, status, payment_status,
                                     payment_method, payment_reference, customer_info,
                                     shipping_method, subtotal, shipping_amount, tax_amount,
                                     total_amount, currency, tracking_number, created_at,
                                     updated_at, paid_at, cancelled_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    order.id.as_str(),
                    order.order_number.as_str(),
                    order.user_id.as_str(),
                    order.email.as_str(),
                    order.status.as_str(),
                    order.payment_status.as_str(),
                    order.payment_method.as_str(),
                    order.payment_reference.clone(),
                    customer_json.as_str(),
                    order.shipping_method.as_str(),
                    order.subtotal.subunits,
                    order.shipping_amount.subunits,
                    order.tax_amount.subunits,
                    order.total_amount.subunits,
                    order.currency.code(),
                    order.tracking_number.clone(),
                    order.created_at,
                    order.updated_at,
                    order.paid_at,
                    order.cancelled_at
                ],
            )?;
            for item in &order.items {
                tx.execute(
                    "INSERT INTO order_items (id, order_id, product_id, variant_id, name,
                                              quantity, unit_price, total_price)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        item.id.as_str(),
                        order.id.as_str(),
                        item.product_id.as_str(),
                        item.variant_id.as_ref().map(|v| v.as_str().to_string()),
                        item.name.as_str(),
                        item.quantity,
                        item.unit_price.subunits,
                        item.total_price.subunits
                    ],
                )?;
            }
            tx.execute(
                "DELETE FROM cart_items WHERE cart_id = ?",
                params![cart.id.as_str()],
            )?;
            tx.execute("DELETE FROM carts WHERE id = ?", params![cart.id.as_str()])?;
            Ok(())
        })?;

        // Remember the shipping details for next checkout. Losing this write
        // must not fail the order.
        let profile = Profile::from_customer(user_id.clone(), &order.customer);
        let _ = self.upsert_profile(&profile);

        Ok(order)
    }

    /// Fetch an order the user owns.
    pub fn find_for_user(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
    ) -> Result<Option<Order>, CommerceError> {
        let row: Option<OrderRow> = self.db.query_optional(
            &format!("{} WHERE id = ? AND user_id = ?", SELECT_ORDER),
            params![order_id.as_str(), user_id.as_str()],
        )?;
        self.hydrate(row)
    }

    /// Fetch an order by id, regardless of owner. Back-office use.
    pub fn find_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, CommerceError> {
        let row: Option<OrderRow> = self.db.query_optional(
            &format!("{} WHERE id = ?", SELECT_ORDER),
            params![order_id.as_str()],
        )?;
        self.hydrate(row)
    }

    /// List the user's orders, newest first.
    pub fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let rows: Vec<OrderRow> = self.db.query_as(
            &format!(
                "{} WHERE user_id = ? ORDER BY created_at DESC",
                SELECT_ORDER
            ),
            params![user_id.as_str()],
        )?;
        rows.into_iter()
            .map(|row| {
                let items = self.items_for(&row.id)?;
                row.into_order(items)
            })
            .collect()
    }

    /// List every order, newest first. Back-office use.
    pub fn list_all(&self) -> Result<Vec<Order>, CommerceError> {
        let rows: Vec<OrderRow> = self
            .db
            .query_as(&format!("{} ORDER BY created_at DESC", SELECT_ORDER), &[])?;
        rows.into_iter()
            .map(|row| {
                let items = self.items_for(&row.id)?;
                row.into_order(items)
            })
            .collect()
    }

    /// Settle payment on the user's order after gateway verification.
    ///
    /// Replay against an already-paid order surfaces the conflict from the
    /// domain guard and writes nothing.
    pub fn mark_paid(
        &self,
        order_id: &OrderId,
        user_id: &UserId,
        payment_reference: &str,
    ) -> Result<Order, CommerceError> {
        let mut order = self
            .find_for_user(order_id, user_id)?
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;
        order.mark_paid(Some(payment_reference.to_string()))?;
        self.save_status(&order)?;
        Ok(order)
    }

    /// Move an order along the status walk. Back-office use.
    ///
    /// A tracking number may be attached in the same update, typically when
    /// marking the order shipped.
    pub fn update_status(
        &self,
        order_id: &OrderId,
        next: OrderStatus,
        tracking_number: Option<String>,
    ) -> Result<Order, CommerceError> {
        let mut order = self
            .find_by_id(order_id)?
            .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;
        order.transition_to(next)?;
        if let Some(awb) = tracking_number {
            order.tracking_number = Some(awb);
        }
        self.save_status(&order)?;
        Ok(order)
    }

    fn save_status(&self, order: &Order) -> Result<(), CommerceError> {
        self.db.execute(
            "UPDATE orders SET status = ?, payment_status = ?, payment_reference = ?,
                    tracking_number = ?, updated_at = ?, paid_at = ?, cancelled_at = ?
             WHERE id = ?",
            params![
                order.status.as_str(),
                order.payment_status.as_str(),
                order.payment_reference.clone(),
                order.tracking_number.clone(),
                order.updated_at,
                order.paid_at,
                order.cancelled_at,
                order.id.as_str()
            ],
        )?;
        Ok(())
    }

    fn upsert_profile(&self, profile: &Profile) -> Result<(), CommerceError> {
        self.db.execute(
            "INSERT INTO profiles (user_id, phone, address_line1, address_line2, city, state,
                                   postal_code, country, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET
                 phone = excluded.phone,
                 address_line1 = excluded.address_line1,
                 address_line2 = excluded.address_line2,
                 city = excluded.city,
                 state = excluded.state,
                 postal_code = excluded.postal_code,
                 country = excluded.country,
                 updated_at = excluded.updated_at",
            params![
                profile.user_id.as_str(),
                profile.phone.clone(),
                profile.address_line1.clone(),
                profile.address_line2.clone(),
                profile.city.clone(),
                profile.state.clone(),
                profile.postal_code.clone(),
                profile.country.clone(),
                profile.updated_at
            ],
        )?;
        Ok(())
    }

    fn hydrate(&self, row: Option<OrderRow>) -> Result<Option<Order>, CommerceError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let items = self.items_for(&row.id)?;
        row.into_order(items).map(Some)
    }

    fn items_for(&self, order_id: &str) -> Result<Vec<OrderItem>, CommerceError> {
        let rows: Vec<OrderItemRow> = self.db.query_as(
            "SELECT oi.id, oi.product_id, oi.variant_id, oi.name, oi.quantity,
                    oi.unit_price, oi.total_price, o.currency
             FROM order_items oi JOIN orders o ON o.id = oi.order_id
             WHERE oi.order_id = ? ORDER BY oi.rowid",
            params![order_id],
        )?;
        Ok(rows.into_iter().map(OrderItemRow::into_item).collect())
    }
}

const SELECT_ORDER: &str = "SELECT id, order_number, user_id, email, status, payment_status,
        payment_method, payment_reference, customer_info, shipping_method, subtotal,
        shipping_amount, tax_amount, total_amount, currency, tracking_number, created_at,
        updated_at, paid_at, cancelled_at
 FROM orders";

#[derive(Debug, Deserialize)]
struct OrderRow {
    id: String,
    order_number: String,
    user_id: String,
    email: String,
    status: String,
    payment_status: String,
    payment_method: String,
    payment_reference: Option<String>,
    customer_info: String,
    shipping_method: String,
    subtotal: i64,
    shipping_amount: i64,
    tax_amount: i64,
    total_amount: i64,
    currency: String,
    tracking_number: Option<String>,
    created_at: i64,
    updated_at: i64,
    paid_at: Option<i64>,
    cancelled_at: Option<i64>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, CommerceError> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            CommerceError::DatabaseError(format!("unknown order status: {}", self.status))
        })?;
        let payment_status = PaymentStatus::parse(&self.payment_status).ok_or_else(|| {
            CommerceError::DatabaseError(format!(
                "unknown payment status: {}",
                self.payment_status
            ))
        })?;
        let payment_method = PaymentMethod::parse(&self.payment_method).ok_or_else(|| {
            CommerceError::DatabaseError(format!(
                "unknown payment method: {}",
                self.payment_method
            ))
        })?;
        let shipping_method = ShippingMethod::parse(&self.shipping_method).ok_or_else(|| {
            CommerceError::DatabaseError(format!(
                "unknown shipping method: {}",
                self.shipping_method
            ))
        })?;
        let customer: CustomerInfo = serde_json::from_str(&self.customer_info)?;
        let currency = Currency::from_code(&self.currency).unwrap_or_default();

        Ok(Order {
            id: OrderId::new(self.id),
            order_number: self.order_number,
            user_id: UserId::new(self.user_id),
            email: self.email,
            status,
            payment_status,
            payment_method,
            payment_reference: self.payment_reference,
            items,
            customer,
            shipping_method,
            subtotal: Money::new(self.subtotal, currency),
            shipping_amount: Money::new(self.shipping_amount, currency),
            tax_amount: Money::new(self.tax_amount, currency),
            total_amount: Money::new(self.total_amount, currency),
            currency,
            tracking_number: self.tracking_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
            paid_at: self.paid_at,
            cancelled_at: self.cancelled_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OrderItemRow {
    id: String,
    product_id: String,
    variant_id: Option<String>,
    name: String,
    quantity: i64,
    unit_price: i64,
    total_price: i64,
    currency: String,
}

impl OrderItemRow {
    fn into_item(self) -> OrderItem {
        let currency = Currency::from_code(&self.currency).unwrap_or_default();
        OrderItem {
            id: OrderItemId::new(self.id),
            product_id: ProductId::new(self.product_id),
            variant_id: self.variant_id.map(VariantId::new),
            name: self.name,
            quantity: self.quantity,
            unit_price: Money::new(self.unit_price, currency),
            total_price: Money::new(self.total_price, currency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProductId;

    fn sample_customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "Asha".to_string(),
            last_name: "Nair".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            address_line1: "14 Temple Road".to_string(),
            address_line2: None,
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            postal_code: "682001".to_string(),
            country: "India".to_string(),
        }
    }

    fn sample_cart() -> Cart {
        let mut cart = Cart::new("sess_abc");
        cart.add_item(
            ProductId::new("prod_1"),
            None,
            "Silk Scarf",
            2,
            Money::new(50000, Currency::INR),
        )
        .unwrap();
        cart.add_item(
            ProductId::new("prod_2"),
            None,
            "Indigo Stole",
            1,
            Money::new(120000, Currency::INR),
        )
        .unwrap();
        cart
    }

    #[test]
    fn test_create_prices_the_cart() {
        let store = OrderStore::open_default().unwrap();
        let order = store
            .create(
                &UserId::new("user_1"),
                &sample_cart(),
                sample_customer(),
                ShippingMethod::Standard,
                PaymentMethod::Online,
            )
            .unwrap();

        assert_eq!(order.subtotal, Money::new(220000, Currency::INR));
        assert_eq!(order.shipping_amount, Money::new(9900, Currency::INR));
        assert_eq!(order.tax_amount, Money::new(39600, Currency::INR));
        assert_eq!(order.total_amount, Money::new(269500, Currency::INR));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 2);
    }

    #[test]
    fn test_create_cod_is_paid_at_placement() {
        let store = OrderStore::open_default().unwrap();
        let order = store
            .create(
                &UserId::new("user_1"),
                &sample_cart(),
                sample_customer(),
                ShippingMethod::Pickup,
                PaymentMethod::CashOnDelivery,
            )
            .unwrap();

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.payment_status, PaymentStatus::Completed);
        assert!(order.payment_reference.is_none());
        assert!(order.paid_at.is_some());
    }

    #[test]
    fn test_create_rejects_empty_cart() {
        let store = OrderStore::open_default().unwrap();
        let result = store.create(
            &UserId::new("user_1"),
            &Cart::new("sess_abc"),
            sample_customer(),
            ShippingMethod::Standard,
            PaymentMethod::Online,
        );
        assert!(matches!(result, Err(CommerceError::ValidationError(_))));
    }

    #[test]
    fn test_create_rejects_bad_customer() {
        let store = OrderStore::open_default().unwrap();
        let mut customer = sample_customer();
        customer.postal_code = "68".to_string();
        let result = store.create(
            &UserId::new("user_1"),
            &sample_cart(),
            customer,
            ShippingMethod::Standard,
            PaymentMethod::Online,
        );
        assert!(matches!(result, Err(CommerceError::ValidationError(_))));
    }

    #[test]
    fn test_mark_paid_unknown_order() {
        let store = OrderStore::open_default().unwrap();
        let result = store.mark_paid(
            &OrderId::new("order_missing"),
            &UserId::new("user_1"),
            "pay_abc",
        );
        assert!(matches!(result, Err(CommerceError::OrderNotFound(_))));
    }

    #[test]
    fn test_order_row_round_trip() {
        let customer = sample_customer();
        let row = OrderRow {
            id: "order_1".to_string(),
            order_number: "ORD-1700000000".to_string(),
            user_id: "user_1".to_string(),
            email: customer.email.clone(),
            status: "paid".to_string(),
            payment_status: "completed".to_string(),
            payment_method: "online".to_string(),
            payment_reference: Some("pay_abc".to_string()),
            customer_info: serde_json::to_string(&customer).unwrap(),
            shipping_method: "standard".to_string(),
            subtotal: 220000,
            shipping_amount: 9900,
            tax_amount: 39600,
            total_amount: 269500,
            currency: "INR".to_string(),
            tracking_number: None,
            created_at: 1,
            updated_at: 2,
            paid_at: Some(2),
            cancelled_at: None,
        };

        let order = row.into_order(Vec::new()).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.shipping_method, ShippingMethod::Standard);
        assert_eq!(order.customer.city, "Kochi");
        assert_eq!(order.total_amount, Money::new(269500, Currency::INR));
    }

    #[test]
    fn test_order_row_rejects_unknown_status() {
        let customer = sample_customer();
        let row = OrderRow {
            id: "order_1".to_string(),
            order_number: "ORD-1".to_string(),
            user_id: "user_1".to_string(),
            email: customer.email.clone(),
            status: "lost".to_string(),
            payment_status: "pending".to_string(),
            payment_method: "online".to_string(),
            payment_reference: None,
            customer_info: serde_json::to_string(&customer).unwrap(),
            shipping_method: "standard".to_string(),
            subtotal: 0,
            shipping_amount: 0,
            tax_amount: 0,
            total_amount: 0,
            currency: "INR".to_string(),
            tracking_number: None,
            created_at: 0,
            updated_at: 0,
            paid_at: None,
            cancelled_at: None,
        };
        assert!(matches!(
            row.into_order(Vec::new()),
            Err(CommerceError::DatabaseError(_))
        ));
    }
}
