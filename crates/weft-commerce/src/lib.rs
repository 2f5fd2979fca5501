//! Commerce domain types and logic for Weft.
//!
//! This crate carries the storefront's domain model and its SQLite
//! repositories:
//!
//! - **Catalog**: Products, variants, media, categories
//! - **Cart**: Per-identity carts with snapshotted prices and derived totals
//! - **Checkout**: One shared totals calculator, orders, status transitions
//! - **Contact**: Contact form submissions
//! - **Audit**: Append-only log entries for payment verification
//! - **Store**: Repositories over `weft-db`
//!
//! Money is integer paisa under the hood; totals are derived, never stored.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_commerce::prelude::*;
//!
//! let mut cart = Cart::new("sess_abc");
//! cart.add_item(
//!     ProductId::new("prod_1"),
//!     None,
//!     "Banarasi Silk Scarf",
//!     2,
//!     Money::from_decimal(500.0, Currency::INR),
//! )?;
//!
//! let totals = calculate_totals(cart.subtotal()?, ShippingMethod::Standard)?;
//! assert_eq!(totals.total, Money::from_decimal(1279.0, Currency::INR));
//! ```

pub mod error;
pub mod ids;
pub mod money;

mod validate;

pub mod audit;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod store;

pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{
        build_tree, Category, CategoryNode, Product, ProductMedia, ProductStatus, ProductVariant,
        VariantOption,
    };

    // Cart
    pub use crate::cart::{Cart, CartItem, MAX_QUANTITY_PER_ITEM};

    // Checkout
    pub use crate::checkout::{
        calculate_totals, CustomerInfo, Order, OrderItem, OrderStatus, OrderTotals, PaymentMethod,
        PaymentStatus, Profile, ShippingMethod,
    };

    // Contact
    pub use crate::contact::ContactSubmission;

    // Audit
    pub use crate::audit::AuditLogEntry;

    // Repositories
    pub use crate::store::{
        AuditStore, CartStore, CatalogStore, ContactStore, OrderStore, ProductDetail,
    };
}
