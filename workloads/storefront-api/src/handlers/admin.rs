//! Back-office endpoints. Staff role or better.

use crate::http::{json_response, parse_json, ApiError};
use crate::logging::RequestLogger;
use serde::Deserialize;
use spin_sdk::http::Response;
use weft_auth::{AuthSession, Role};
use weft_commerce::prelude::*;

#[derive(Deserialize)]
struct UpdateOrderRequest {
    status: String,
    #[serde(default)]
    tracking_number: Option<String>,
}

/// `GET /api/admin/orders`: every order in the store, newest first.
pub fn list_orders(session: &AuthSession) -> Result<Response, ApiError> {
    session.require_role(Role::Staff)?;
    let orders = OrderStore::open_default()?.list_all()?;
    Ok(json_response(200, &serde_json::json!({ "orders": orders })))
}

/// `PATCH /api/admin/orders/:id`: move an order along its lifecycle,
/// optionally attaching the courier AWB in the same update.
pub fn update_order(
    order_id: &str,
    body: &[u8],
    session: &AuthSession,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    session.require_role(Role::Staff)?;
    let request: UpdateOrderRequest = parse_json(body)?;
    let next = OrderStatus::parse(&request.status)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown order status: {}", request.status)))?;

    let order_id = OrderId::new(order_id);
    let order =
        OrderStore::open_default()?.update_status(&order_id, next, request.tracking_number)?;

    logger.info_with(
        "order status updated",
        &[
            ("order_number", &order.order_number),
            ("status", &order.status.as_str()),
        ],
    );

    Ok(json_response(200, &serde_json::json!({ "order": order })))
}

/// `GET /api/admin/contact`: the contact inbox, newest first.
pub fn list_contact(session: &AuthSession) -> Result<Response, ApiError> {
    session.require_role(Role::Staff)?;
    let submissions = ContactStore::open_default()?.list()?;
    Ok(json_response(
        200,
        &serde_json::json!({ "submissions": submissions }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_role(role: Role) -> AuthSession {
        let mut session = AuthSession::anonymous();
        session
            .upgrade(weft_auth::User::authenticated(
                UserId::new("user_1"),
                "staff@example.com",
                None,
                role,
            ))
            .unwrap();
        session
    }

    #[test]
    fn test_anonymous_caller_is_unauthorized() {
        let err = list_orders(&AuthSession::anonymous()).unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_customer_is_forbidden() {
        let err = list_orders(&session_with_role(Role::Customer)).unwrap_err();
        assert_eq!(err.status(), 403);
    }

    #[test]
    fn test_staff_can_list_orders() {
        let response = list_orders(&session_with_role(Role::Staff)).unwrap();
        assert_eq!(*response.status(), 200);
    }

    #[test]
    fn test_admin_can_list_orders() {
        let response = list_orders(&session_with_role(Role::Admin)).unwrap();
        assert_eq!(*response.status(), 200);
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let session = session_with_role(Role::Staff);
        let logger = RequestLogger::new("req_test");
        let body = br#"{"status": "teleported"}"#;
        let err = update_order("ord_1", body, &session, &logger).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_update_unknown_order_is_not_found() {
        let session = session_with_role(Role::Staff);
        let logger = RequestLogger::new("req_test");
        let body = br#"{"status": "processing"}"#;
        let err = update_order("ord_missing", body, &session, &logger).unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_contact_inbox_requires_staff() {
        let err = list_contact(&session_with_role(Role::Customer)).unwrap_err();
        assert_eq!(err.status(), 403);
    }
}
