//! Hosted-checkout payment flow: intent creation and verification.

use crate::config;
use crate::http::{json_response, parse_json, ApiError};
use crate::logging::RequestLogger;
use serde::Deserialize;
use spin_sdk::http::Response;
use weft_auth::AuthSession;
use weft_commerce::prelude::*;
use weft_payments::{validate_amount, verify_signature, GatewayClient};

#[derive(Deserialize)]
struct CreateIntentRequest {
    order_id: String,
    amount: f64,
}

#[derive(Deserialize)]
struct VerifyRequest {
    order_id: String,
    remote_order_id: String,
    payment_id: String,
    signature: String,
}

/// `POST /api/payments/create-intent`: register a pending order with the
/// gateway and hand the client what its checkout widget needs.
pub async fn create_intent(
    body: &[u8],
    session: &AuthSession,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    let user_id = session.require_user()?.clone();
    let request: CreateIntentRequest = parse_json(body)?;
    let order_id = OrderId::new(request.order_id);

    let orders = OrderStore::open_default()?;
    let order = orders
        .find_for_user(&order_id, &user_id)?
        .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

    if order.status != OrderStatus::Pending {
        return Err(CommerceError::OrderAlreadyProcessed(order.order_number).into());
    }

    // The client restates the amount it is about to charge; it must agree
    // with the order before anything reaches the gateway.
    validate_amount(request.amount, order.total_amount)?;

    let gateway = GatewayClient::new(config::gateway()?);
    let remote = gateway
        .create_order(order.total_amount, &order.order_number)
        .await
        .map_err(|e| {
            logger.error_with(
                "gateway order creation failed",
                &[("order_number", &order.order_number), ("error", &e)],
            );
            ApiError::from(e)
        })?;

    logger.info_with(
        "payment intent created",
        &[
            ("order_number", &order.order_number),
            ("remote_order_id", &remote.id),
        ],
    );

    Ok(json_response(
        200,
        &serde_json::json!({
            "remote_order_id": remote.id,
            "amount": remote.amount,
            "currency": remote.currency,
            "key_id": gateway.key_id(),
        }),
    ))
}

/// `POST /api/payments/verify`: check the gateway's signature and settle
/// the order.
///
/// The signature must verify before anything mutates. A replay against an
/// already-settled order is a conflict and leaves the stored reference
/// untouched.
pub fn verify(
    body: &[u8],
    session: &AuthSession,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    let user_id = session.require_user()?.clone();
    let request: VerifyRequest = parse_json(body)?;
    let order_id = OrderId::new(request.order_id);

    let orders = OrderStore::open_default()?;
    let order = orders
        .find_for_user(&order_id, &user_id)?
        .ok_or_else(|| CommerceError::OrderNotFound(order_id.to_string()))?;

    let config = config::gateway()?;
    verify_signature(
        &config.key_secret,
        &request.remote_order_id,
        &request.payment_id,
        &request.signature,
    )
    .map_err(|e| {
        logger.warn_with(
            "payment verification rejected",
            &[("order_number", &order.order_number)],
        );
        ApiError::from(e)
    })?;

    let order = orders.mark_paid(&order_id, &user_id, &request.payment_id)?;

    // The order is settled at this point; a lost ledger row is logged, not
    // surfaced.
    let entry = AuditLogEntry::payment_verified(
        user_id.clone(),
        &order_id,
        &request.payment_id,
        order.total_amount,
    );
    if let Err(e) = AuditStore::open_default().and_then(|audit| audit.append(&entry)) {
        logger.warn_with("audit append failed", &[("error", &e)]);
    }

    logger.info_with(
        "payment verified",
        &[
            ("order_number", &order.order_number),
            ("payment_id", &request.payment_id),
        ],
    );

    Ok(json_response(
        200,
        &serde_json::json!({
            "order_number": order.order_number,
            "status": order.status,
            "payment_status": order.payment_status,
            "payment_reference": order.payment_reference,
        }),
    ))
}
