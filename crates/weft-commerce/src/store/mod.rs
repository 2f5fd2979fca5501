//! SQLite repositories over `weft-db`.
//!
//! Each store wraps its own connection handle; opens are cheap in the Spin
//! runtime, so handlers open per request. Row structs are private to each
//! store and convert into the domain types at the boundary.

mod audit;
mod cart;
mod catalog;
mod contact;
mod order;

pub use audit::AuditStore;
pub use cart::CartStore;
pub use catalog::{CatalogStore, ProductDetail};
pub use contact::ContactStore;
pub use order::OrderStore;
