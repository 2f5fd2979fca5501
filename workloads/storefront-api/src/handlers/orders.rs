//! Customer-facing order history and shipment tracking.

use crate::config;
use crate::http::{json_response, ApiError};
use crate::logging::RequestLogger;
use spin_sdk::http::Response;
use weft_auth::AuthSession;
use weft_commerce::prelude::*;
use weft_shipping::{awaiting_shipment, fallback_timeline, CourierClient, TrackingData};

/// `GET /api/orders`: the signed-in customer's orders, newest first.
pub fn list(session: &AuthSession) -> Result<Response, ApiError> {
    let user_id = session.require_user()?;
    let orders = OrderStore::open_default()?.list_for_user(user_id)?;
    Ok(json_response(200, &serde_json::json!({ "orders": orders })))
}

/// `GET /api/orders/:id`: one order, only for its owner.
pub fn detail(order_id: &str, session: &AuthSession) -> Result<Response, ApiError> {
    let user_id = session.require_user()?;
    let order_id = OrderId::new(order_id);
    let order = OrderStore::open_default()?
        .find_for_user(&order_id, user_id)?
        .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;
    Ok(json_response(200, &serde_json::json!({ "order": order })))
}

/// `GET /api/orders/:id/tracking`: the shipment timeline.
///
/// Live courier data when the order has an AWB and the courier answers;
/// a synthesized timeline otherwise. Once the order is found this endpoint
/// does not hard-fail.
pub async fn tracking(
    order_id: &str,
    session: &AuthSession,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    let user_id = session.require_user()?;
    let order_id = OrderId::new(order_id);
    let order = OrderStore::open_default()?
        .find_for_user(&order_id, user_id)?
        .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

    let data = match order.tracking_number.clone() {
        None => awaiting_shipment(&order),
        Some(awb) => live_or_fallback(&awb, &order, logger).await,
    };

    Ok(json_response(200, &serde_json::json!({ "tracking": data })))
}

async fn live_or_fallback(awb: &str, order: &Order, logger: &RequestLogger) -> TrackingData {
    let fetched: anyhow::Result<TrackingData> = async {
        let client = CourierClient::new(config::courier()?)?;
        Ok(client.track(awb).await?)
    }
    .await;

    match fetched {
        Ok(data) => data,
        Err(e) => {
            logger.warn_with(
                "courier lookup failed, serving synthesized timeline",
                &[("awb", &awb), ("error", &e)],
            );
            fallback_timeline(order)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

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

    #[test]
    fn test_list_requires_authentication() {
        let err = list(&AuthSession::anonymous()).unwrap_err();
        assert_eq!(err.status(), 401);
    }

    #[test]
    fn test_list_with_no_orders_is_empty_not_missing() {
        let response = list(&signed_in_session()).unwrap();
        assert_eq!(*response.status(), 200);
        let body = String::from_utf8(response.into_body()).unwrap();
        assert!(body.contains("\"orders\":[]"));
    }

    #[test]
    fn test_detail_unknown_order_is_not_found() {
        let err = detail("ord_missing", &signed_in_session()).unwrap_err();
        assert_eq!(err.status(), 404);
    }

    #[test]
    fn test_tracking_unknown_order_is_not_found() {
        let logger = RequestLogger::new("req_test");
        let err = block_on(tracking("ord_missing", &signed_in_session(), &logger)).unwrap_err();
        assert_eq!(err.status(), 404);
    }
}
