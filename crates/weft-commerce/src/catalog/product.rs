//! Product, variant, and media types.

use crate::ids::{CategoryId, MediaId, ProductId, VariantId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Product visibility in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    /// Not visible to customers yet.
    Draft,
    /// Visible and orderable.
    #[default]
    Published,
    /// Hidden but data preserved.
    Archived,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Published => "published",
            ProductStatus::Archived => "archived",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(ProductStatus::Draft),
            "published" => Some(ProductStatus::Published),
            "archived" => Some(ProductStatus::Archived),
            _ => None,
        }
    }
}

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Stock keeping unit (unique).
    pub sku: String,
    /// Product name.
    pub name: String,
    /// URL-friendly slug (unique).
    pub slug: String,
    /// Full description.
    pub description: Option<String>,
    /// Visibility status. Only published products are orderable.
    pub status: ProductStatus,
    /// Current price. Snapshotted onto cart lines at add-time.
    pub price: Money,
    /// Original price for showing markdowns.
    pub compare_at_price: Option<Money>,
    /// Units on hand. Bounds the max orderable quantity per line.
    pub stock_quantity: i64,
    /// Category this product is listed under.
    pub category_id: Option<CategoryId>,
    /// Shown on the featured shelf.
    pub featured: bool,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl Product {
    /// Create a new published product.
    pub fn new(
        sku: impl Into<String>,
        name: impl Into<String>,
        slug: impl Into<String>,
        price: Money,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: ProductId::generate(),
            sku: sku.into(),
            name: name.into(),
            slug: slug.into(),
            description: None,
            status: ProductStatus::Published,
            price,
            compare_at_price: None,
            stock_quantity: 0,
            category_id: None,
            featured: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the product is visible and orderable at all.
    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Published
    }

    /// Check if a given quantity can be ordered right now.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.is_published() && quantity > 0 && quantity <= self.stock_quantity
    }

    /// Check if this product is marked down.
    pub fn is_on_sale(&self) -> bool {
        self.compare_at_price
            .map(|cap| cap.subunits > self.price.subunits)
            .unwrap_or(false)
    }

    /// Markdown percentage when on sale.
    pub fn discount_percentage(&self) -> Option<f64> {
        self.compare_at_price.and_then(|cap| {
            if cap.subunits > self.price.subunits {
                let savings = cap.subunits - self.price.subunits;
                Some((savings as f64 / cap.subunits as f64) * 100.0)
            } else {
                None
            }
        })
    }
}

/// A product variant (e.g., a size or colourway).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductVariant {
    /// Unique variant identifier.
    pub id: VariantId,
    /// Parent product ID.
    pub product_id: ProductId,
    /// Stock keeping unit for this variant (unique).
    pub sku: String,
    /// Variant name (e.g., "Maroon / Large").
    pub name: String,
    /// Price of this variant.
    pub price: Money,
    /// Units on hand for this variant.
    pub stock_quantity: i64,
    /// Options that define this variant.
    pub options: Vec<VariantOption>,
    /// Sort order position.
    pub position: i32,
}

impl ProductVariant {
    /// Create a new variant.
    pub fn new(product_id: ProductId, sku: impl Into<String>, price: Money) -> Self {
        Self {
            id: VariantId::generate(),
            product_id,
            sku: sku.into(),
            name: String::new(),
            price,
            stock_quantity: 0,
            options: Vec::new(),
            position: 0,
        }
    }

    /// Check if this variant has stock.
    pub fn is_in_stock(&self) -> bool {
        self.stock_quantity > 0
    }

    /// Build the variant name from options.
    pub fn build_name(&self) -> String {
        if self.options.is_empty() {
            "Default".to_string()
        } else {
            self.options
                .iter()
                .map(|o| o.value.as_str())
                .collect::<Vec<_>>()
                .join(" / ")
        }
    }

    /// Add an option to this variant.
    pub fn add_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.push(VariantOption {
            name: name.into(),
            value: value.into(),
        });
    }
}

/// A variant option (e.g., Size: Large).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct VariantOption {
    /// Option name (e.g., "Size", "Colour").
    pub name: String,
    /// Option value (e.g., "Large", "Maroon").
    pub value: String,
}

impl VariantOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A product image. Each product has at most one primary image; the rest are
/// ordered by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductMedia {
    /// Unique media identifier.
    pub id: MediaId,
    /// Parent product ID.
    pub product_id: ProductId,
    /// URL to the image.
    pub url: String,
    /// Alt text for accessibility.
    pub alt_text: Option<String>,
    /// Sort order position.
    pub position: i32,
    /// Main listing image.
    pub is_primary: bool,
}

impl ProductMedia {
    /// Create a new image for a product.
    pub fn new(product_id: ProductId, url: impl Into<String>) -> Self {
        Self {
            id: MediaId::generate(),
            product_id,
            url: url.into(),
            alt_text: None,
            position: 0,
            is_primary: false,
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
