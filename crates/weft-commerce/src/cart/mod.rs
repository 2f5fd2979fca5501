//! Shopping cart module.
//!
//! Cart contents are rows; totals and counts are always derived on read.

mod cart;

pub use cart::{Cart, CartItem, MAX_QUANTITY_PER_ITEM};
