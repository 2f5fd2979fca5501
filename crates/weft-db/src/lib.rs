//! Type-safe SQLite storage layer for the Weft storefront.
//!
//! Wraps Spin's SQLite database with typed parameters and serde-backed
//! row deserialization. All storefront rows (products, carts, orders,
//! contact submissions, audit log) go through this crate.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_db::{Db, params};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct ProductRow {
//!     id: String,
//!     name: String,
//!     price: i64,
//! }
//!
//! let db = Db::open_default()?;
//! let rows: Vec<ProductRow> = db.query_as(
//!     "SELECT id, name, price FROM products WHERE status = ?",
//!     params!["published"],
//! )?;
//! ```

mod error;
mod db;
mod types;

pub use error::DbError;
pub use db::Db;
pub use types::{Value, Row, QueryResult};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Db, DbError, Value, Row, QueryResult, params};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use weft_db::params;
///
/// let params = params!["cart_1", 2, 49900];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
