//! Checkout: turn the caller's cart into an order.

use crate::http::{json_response, parse_json, ApiError};
use crate::logging::RequestLogger;
use serde::Deserialize;
use spin_sdk::http::Response;
use weft_auth::AuthSession;
use weft_commerce::prelude::*;

#[derive(Deserialize)]
struct CheckoutRequest {
    customer_info: CustomerInfo,
    shipping_method: String,
    payment_method: String,
}

/// `POST /api/checkout`: place an order from the caller's cart.
///
/// Requires an account; the cart is consumed on success. Cash-on-delivery
/// orders come back already paid, prepaid ones pending until the gateway
/// verifies.
pub fn place_order(
    body: &[u8],
    session: &AuthSession,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    let user_id = session.require_user()?.clone();
    let request: CheckoutRequest = parse_json(body)?;

    let shipping_method = ShippingMethod::parse(&request.shipping_method).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown shipping method: {}",
            request.shipping_method
        ))
    })?;
    let payment_method = PaymentMethod::parse(&request.payment_method).ok_or_else(|| {
        ApiError::BadRequest(format!("unknown payment method: {}", request.payment_method))
    })?;

    let carts = CartStore::open_default()?;
    let cart = carts
        .find(session.id.as_str(), Some(&user_id))?
        .ok_or_else(|| ApiError::BadRequest("cart is empty".to_string()))?;

    let orders = OrderStore::open_default()?;
    let order = orders.create(
        &user_id,
        &cart,
        request.customer_info,
        shipping_method,
        payment_method,
    )?;

    logger.info_with(
        "order placed",
        &[
            ("order_number", &order.order_number),
            ("total", &order.total_amount.subunits),
            ("payment_method", &order.payment_method.as_str()),
        ],
    );

    Ok(json_response(201, &serde_json::json!({ "order": order })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> RequestLogger {
        RequestLogger::new("req_test")
    }

    fn signed_in_session() -> AuthSession {
        let mut session = AuthSession::anonymous();
        session
            .upgrade(weft_auth::User::authenticated(
                UserId::new("user_1"),
                "asha@example.com",
                None,
                weft_auth::Role::Customer,
            ))
            .unwrap();
        session
    }

    fn body_with_methods(shipping: &str, payment: &str) -> Vec<u8> {
        serde_json::json!({
            "customer_info": {
                "first_name": "Asha",
                "last_name": "Nair",
                "email": "asha@example.com",
                "phone": "+91 98765 43210",
                "address_line1": "14 Temple Road",
                "address_line2": null,
                "city": "Kochi",
                "state": "Kerala",
                "postal_code": "682001",
                "country": "IN"
            },
            "shipping_method": shipping,
            "payment_method": payment,
        })
        .to_string()
        .into_bytes()
    }

    fn checkout_body() -> Vec<u8> {
        body_with_methods("standard", "online")
    }

    #[test]
    fn test_checkout_requires_authentication() {
        let session = AuthSession::anonymous();
        let err = place_order(&checkout_body(), &session, &logger()).unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_checkout_without_cart_is_rejected() {
        // The host-side store has no cart for this user.
        let session = signed_in_session();
        let err = place_order(&checkout_body(), &session, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.client_message().contains("cart"));
    }

    #[test]
    fn test_unknown_shipping_method_is_rejected() {
        let session = signed_in_session();
        let body = body_with_methods("teleport", "cod");
        let err = place_order(&body, &session, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.client_message().contains("teleport"));
    }

    #[test]
    fn test_legacy_method_spellings_parse() {
        // "express" and "cod" come from older clients; both still parse,
        // so the request gets as far as the cart lookup.
        let session = signed_in_session();
        let body = body_with_methods("express", "cod");
        let err = place_order(&body, &session, &logger()).unwrap_err();
        assert!(err.client_message().contains("cart"));
    }
}
