//! Product catalog module.
//!
//! Contains types for products, variants, media, and categories.

mod category;
mod product;

pub use category::{build_tree, Category, CategoryNode};
pub use product::{Product, ProductMedia, ProductStatus, ProductVariant, VariantOption};
