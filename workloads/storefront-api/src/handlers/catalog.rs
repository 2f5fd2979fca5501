//! Public catalog endpoints.

use crate::http::{json_response, ApiError};
use spin_sdk::http::Response;
use weft_commerce::prelude::*;

/// Filters accepted by `GET /api/products`.
#[derive(Debug, Default, PartialEq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

impl ListQuery {
    /// Parse filters from a URL query string.
    pub fn from_query_string(qs: &str) -> Self {
        let mut query = ListQuery::default();

        for pair in qs.split('&') {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next().unwrap_or("");
            let value = parts.next().unwrap_or("");
            let decoded = urlencoding_decode(value);
            if decoded.is_empty() {
                continue;
            }

            match key {
                "category" => query.category = Some(decoded),
                "q" => query.q = Some(decoded),
                _ => {}
            }
        }

        query
    }
}

/// `GET /api/products`: published products, optionally filtered.
pub fn list_products(query_string: &str) -> Result<Response, ApiError> {
    let query = ListQuery::from_query_string(query_string);
    let catalog = CatalogStore::open_default()?;
    let products = catalog.list_published(query.category.as_deref(), query.q.as_deref())?;

    Ok(json_response(
        200,
        &serde_json::json!({ "products": products }),
    ))
}

/// `GET /api/products/:slug`: one published product with media and variants.
pub fn product_detail(slug: &str) -> Result<Response, ApiError> {
    let catalog = CatalogStore::open_default()?;
    let detail = catalog
        .find_by_slug(slug)?
        .ok_or_else(|| CommerceError::ProductNotFound(slug.to_string()))?;

    Ok(json_response(200, &detail))
}

/// `GET /api/categories`: the category tree in menu order.
pub fn list_categories() -> Result<Response, ApiError> {
    let catalog = CatalogStore::open_default()?;
    let tree = build_tree(catalog.list_categories()?);

    Ok(json_response(
        200,
        &serde_json::json!({ "categories": tree }),
    ))
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                result.push(byte as char);
            }
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }

    result
}
