//! Catalog read repository.

use crate::catalog::{Category, Product, ProductMedia, ProductStatus, ProductVariant, VariantOption};
use crate::error::CommerceError;
use crate::ids::{CategoryId, MediaId, ProductId, VariantId};
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};
use weft_db::{params, Db, Value};

/// A product with its media and variants, as served on the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub product: Product,
    pub media: Vec<ProductMedia>,
    pub variants: Vec<ProductVariant>,
}

/// Read access to products, variants, media, and categories.
pub struct CatalogStore {
    db: Db,
}

impl CatalogStore {
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

    /// List published products, optionally filtered by category slug and a
    /// case-insensitive name/description search.
    pub fn list_published(
        &self,
        category_slug: Option<&str>,
        search: Option<&str>,
    ) -> Result<Vec<Product>, CommerceError> {
        let mut sql = String::from(
            "SELECT id, sku, name, slug, description, status, price, compare_at_price,
                    currency, stock_quantity, category_id, featured, created_at, updated_at
             FROM products WHERE status = 'published'",
        );
        let mut query_params: Vec<Value> = Vec::new();

        if let Some(slug) = category_slug {
            sql.push_str(" AND category_id = (SELECT id FROM categories WHERE slug = ?)");
            query_params.push(Value::from(slug));
        }
        if let Some(q) = search {
            sql.push_str(" AND (name LIKE ? OR COALESCE(description, '') LIKE ?)");
            let pattern = format!("%{}%", q);
            query_params.push(Value::from(pattern.clone()));
            query_params.push(Value::from(pattern));
        }
        sql.push_str(" ORDER BY featured DESC, created_at DESC");

        let rows: Vec<ProductRow> = self.db.query_as(&sql, &query_params)?;
        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Fetch a published product by slug, with its media and variants.
    pub fn find_by_slug(&self, slug: &str) -> Result<Option<ProductDetail>, CommerceError> {
        let row: Option<ProductRow> = self.db.query_optional(
            "SELECT id, sku, name, slug, description, status, price, compare_at_price,
                    currency, stock_quantity, category_id, featured, created_at, updated_at
             FROM products WHERE slug = ? AND status = 'published'",
            params![slug],
        )?;
        let Some(row) = row else {
            return Ok(None);
        };

        let product = row.into_product()?;
        let media = self.media_for(&product.id)?;
        let variants = self.variants_for(&product.id)?;
        Ok(Some(ProductDetail {
            product,
            media,
            variants,
        }))
    }

    /// Fetch a product by id regardless of status. The cart layer decides
    /// what "orderable" means.
    pub fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, CommerceError> {
        let row: Option<ProductRow> = self.db.query_optional(
            "SELECT id, sku, name, slug, description, status, price, compare_at_price,
                    currency, stock_quantity, category_id, featured, created_at, updated_at
             FROM products WHERE id = ?",
            params![id.as_str()],
        )?;
        row.map(ProductRow::into_product).transpose()
    }

    /// List all categories, ordered for tree assembly.
    pub fn list_categories(&self) -> Result<Vec<Category>, CommerceError> {
        let rows: Vec<CategoryRow> = self.db.query_as(
            "SELECT id, parent_id, name, slug, description, image_url, position,
                    created_at, updated_at
             FROM categories ORDER BY position, name",
            &[],
        )?;
        Ok(rows.into_iter().map(CategoryRow::into_category).collect())
    }

    fn media_for(&self, product_id: &ProductId) -> Result<Vec<ProductMedia>, CommerceError> {
        let rows: Vec<MediaRow> = self.db.query_as(
            "SELECT id, product_id, url, alt_text, position, is_primary
             FROM product_media WHERE product_id = ?
             ORDER BY is_primary DESC, position",
            params![product_id.as_str()],
        )?;
        Ok(rows.into_iter().map(MediaRow::into_media).collect())
    }

    fn variants_for(&self, product_id: &ProductId) -> Result<Vec<ProductVariant>, CommerceError> {
        let rows: Vec<VariantRow> = self.db.query_as(
            "SELECT id, product_id, sku, name, price, currency, stock_quantity,
                    options, position
             FROM product_variants WHERE product_id = ? ORDER BY position",
            params![product_id.as_str()],
        )?;
        rows.into_iter().map(VariantRow::into_variant).collect()
    }
}

#[derive(Debug, Deserialize)]
struct ProductRow {
    id: String,
    sku: String,
    name: String,
    slug: String,
    description: Option<String>,
    status: String,
    price: i64,
    compare_at_price: Option<i64>,
    currency: String,
    stock_quantity: i64,
    category_id: Option<String>,
    featured: i64,
    created_at: i64,
    updated_at: i64,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, CommerceError> {
        let status = ProductStatus::parse(&self.status).ok_or_else(|| {
            CommerceError::DatabaseError(format!("unknown product status: {}", self.status))
        })?;
        let currency = Currency::from_code(&self.currency).unwrap_or_default();
        Ok(Product {
            id: ProductId::new(self.id),
            sku: self.sku,
            name: self.name,
            slug: self.slug,
            description: self.description,
            status,
            price: Money::new(self.price, currency),
            compare_at_price: self.compare_at_price.map(|p| Money::new(p, currency)),
            stock_quantity: self.stock_quantity,
            category_id: self.category_id.map(CategoryId::new),
            featured: self.featured != 0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Deserialize)]
struct CategoryRow {
    id: String,
    parent_id: Option<String>,
    name: String,
    slug: String,
    description: Option<String>,
    image_url: Option<String>,
    position: i64,
    created_at: i64,
    updated_at: i64,
}

impl CategoryRow {
    fn into_category(self) -> Category {
        Category {
            id: CategoryId::new(self.id),
            parent_id: self.parent_id.map(CategoryId::new),
            name: self.name,
            slug: self.slug,
            description: self.description,
            image_url: self.image_url,
            position: self.position as i32,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MediaRow {
    id: String,
    product_id: String,
    url: String,
    alt_text: Option<String>,
    position: i64,
    is_primary: i64,
}

impl MediaRow {
    fn into_media(self) -> ProductMedia {
        ProductMedia {
            id: MediaId::new(self.id),
            product_id: ProductId::new(self.product_id),
            url: self.url,
            alt_text: self.alt_text,
            position: self.position as i32,
            is_primary: self.is_primary != 0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VariantRow {
    id: String,
    product_id: String,
    sku: String,
    name: String,
    price: i64,
    currency: String,
    stock_quantity: i64,
    options: Option<String>,
    position: i64,
}

impl VariantRow {
    fn into_variant(self) -> Result<ProductVariant, CommerceError> {
        let currency = Currency::from_code(&self.currency).unwrap_or_default();
        let options: Vec<VariantOption> = match self.options.as_deref() {
            Some(json) if !json.is_empty() => serde_json::from_str(json)?,
            _ => Vec::new(),
        };
        Ok(ProductVariant {
            id: VariantId::new(self.id),
            product_id: ProductId::new(self.product_id),
            sku: self.sku,
            name: self.name,
            price: Money::new(self.price, currency),
            stock_quantity: self.stock_quantity,
            options,
            position: self.position as i32,
        })
    }
}
