//! Cart endpoints. Guests and account holders share the same surface.

use crate::http::{json_response, parse_json, ApiError};
use serde::Deserialize;
use spin_sdk::http::Response;
use weft_auth::AuthSession;
use weft_commerce::prelude::*;

#[derive(Deserialize)]
struct AddItemRequest {
    product_id: String,
    quantity: i64,
    #[serde(default)]
    variant_id: Option<String>,
}

#[derive(Deserialize)]
struct UpdateItemRequest {
    quantity: i64,
}

/// `GET /api/cart`: the caller's cart with derived totals.
///
/// A shopper with no cart yet gets an empty one rather than a 404.
pub fn get_cart(session: &AuthSession) -> Result<Response, ApiError> {
    let carts = CartStore::open_default()?;
    let cart = match carts.find(session.id.as_str(), session.user.user_id())? {
        Some(cart) => cart,
        None => match session.user.user_id() {
            Some(id) => Cart::for_user(id.clone(), session.id.as_str()),
            None => Cart::new(session.id.as_str()),
        },
    };

    cart_response(200, &cart)
}

/// `POST /api/cart/items`: add a product (or variant) to the cart.
pub fn add_item(body: &[u8], session: &AuthSession) -> Result<Response, ApiError> {
    let request: AddItemRequest = parse_json(body)?;

    let carts = CartStore::open_default()?;
    let cart = carts.add(
        session.id.as_str(),
        session.user.user_id(),
        &ProductId::new(request.product_id),
        request.variant_id.map(VariantId::new).as_ref(),
        request.quantity,
    )?;

    cart_response(201, &cart)
}

/// `PATCH /api/cart/items/:id`: change a line's quantity. Zero or less
/// removes the line.
pub fn update_item(
    body: &[u8],
    session: &AuthSession,
    line_item_id: &str,
) -> Result<Response, ApiError> {
    let request: UpdateItemRequest = parse_json(body)?;

    let carts = CartStore::open_default()?;
    let cart = carts.update_quantity(
        session.id.as_str(),
        session.user.user_id(),
        &LineItemId::new(line_item_id),
        request.quantity,
    )?;

    cart_response(200, &cart)
}

/// `DELETE /api/cart/items/:id`: remove one line.
pub fn remove_item(session: &AuthSession, line_item_id: &str) -> Result<Response, ApiError> {
    let carts = CartStore::open_default()?;
    let cart = carts.remove(
        session.id.as_str(),
        session.user.user_id(),
        &LineItemId::new(line_item_id),
    )?;

    cart_response(200, &cart)
}

/// `DELETE /api/cart`: drop the whole cart.
pub fn clear(session: &AuthSession) -> Result<Response, ApiError> {
    let carts = CartStore::open_default()?;
    carts.clear(session.id.as_str(), session.user.user_id())?;

    Ok(json_response(200, &serde_json::json!({ "ok": true })))
}

fn cart_response(status: u16, cart: &Cart) -> Result<Response, ApiError> {
    let subtotal = cart.subtotal()?;
    Ok(json_response(
        status,
        &serde_json::json!({
            "cart": cart,
            "subtotal": subtotal,
            "item_count": cart.item_count(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cart_returns_empty_cart_for_new_shopper() {
        let session = AuthSession::anonymous();
        let response = get_cart(&session).unwrap();
        assert_eq!(*response.status(), 200);

        let body: serde_json::Value = serde_json::from_slice(&response.into_body()).unwrap();
        assert_eq!(body["item_count"], 0);
        assert_eq!(body["cart"]["items"], serde_json::json!([]));
        assert_eq!(body["subtotal"]["subunits"], 0);
    }

    #[test]
    fn test_add_unknown_product_is_not_found() {
        // The host-side store has no products.
        let session = AuthSession::anonymous();
        let body = br#"{"product_id": "prod_missing", "quantity": 1}"#;
        let err = add_item(body, &session).unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_update_without_cart_is_not_found() {
        let session = AuthSession::anonymous();
        let body = br#"{"quantity": 3}"#;
        let err = update_item(body, &session, "li_1").unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let session = AuthSession::anonymous();
        let err = add_item(br#"{"quantity": 1}"#, &session).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_clear_missing_cart_succeeds() {
        let session = AuthSession::anonymous();
        let response = clear(&session).unwrap();
        assert_eq!(*response.status(), 200);
    }
}
