//! Error taxonomy and JSON response shaping.
//!
//! Every failure leaves the component as `{"error": {"code", "message"}}`
//! with a status from the table below. Internal variants keep their detail
//! for the request log and send the client a generic message.

use serde::Serialize;
use spin_sdk::http::Response;
use weft_auth::AuthError;
use weft_cache::CacheError;
use weft_commerce::CommerceError;
use weft_payments::PaymentError;
use weft_shipping::ShippingError;

/// An error surfaced to the client.
#[derive(Debug)]
pub enum ApiError {
    /// 400: malformed or invalid input.
    BadRequest(String),
    /// 401: missing or failed authentication.
    Unauthorized(String),
    /// 403: authenticated but not allowed.
    Forbidden(String),
    /// 404: the referenced thing does not exist.
    NotFound(String),
    /// 409: the request conflicts with current state.
    Conflict(String),
    /// 429: rate limit exceeded for this client.
    RateLimited { retry_after_secs: u64 },
    /// 500: our fault. The detail stays in the log.
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::RateLimited { .. } => 429,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::RateLimited { .. } => "rate_limited",
            ApiError::Internal(_) => "internal_error",
        }
    }

    /// The message sent to the client.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::RateLimited { retry_after_secs } => {
                format!("Too many requests. Retry in {retry_after_secs}s.")
            }
            ApiError::Internal(_) => "Something went wrong on our side".to_string(),
        }
    }

    /// The full detail for the request log.
    pub fn log_message(&self) -> String {
        match self {
            ApiError::Internal(detail) => detail.clone(),
            other => other.client_message(),
        }
    }

    /// Build the JSON error response.
    pub fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.client_message(),
            },
        };
        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":{"code":"internal_error","message":"error encoding failed"}}"#.to_string()
        });

        let mut builder = Response::builder();
        builder
            .status(self.status())
            .header("content-type", "application/json");
        if let ApiError::RateLimited { retry_after_secs } = &self {
            builder.header("retry-after", retry_after_secs.to_string());
        }
        builder.body(json).build()
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: String,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UserAlreadyExists(_) => {
                ApiError::Conflict("an account with this email already exists".to_string())
            }
            AuthError::WeakPassword(msg) => ApiError::BadRequest(format!("password too weak: {msg}")),
            AuthError::AccountLocked => ApiError::Unauthorized(
                "account locked after repeated failed logins, try again later".to_string(),
            ),
            err if err.is_auth_failure() => ApiError::Unauthorized(err.to_string()),
            err if err.is_permission_error() => ApiError::Forbidden(err.to_string()),
            AuthError::CsrfMismatch => ApiError::Forbidden("CSRF token mismatch".to_string()),
            err => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<CommerceError> for ApiError {
    fn from(err: CommerceError) -> Self {
        if err.is_not_found() {
            return ApiError::NotFound(err.to_string());
        }
        if err.is_conflict() {
            return ApiError::Conflict(err.to_string());
        }
        match err {
            CommerceError::DatabaseError(_)
            | CommerceError::SerializationError(_)
            | CommerceError::Overflow => ApiError::Internal(err.to_string()),
            err => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::VerificationFailed
            | PaymentError::InvalidAmount(_)
            | PaymentError::AmountMismatch { .. } => ApiError::BadRequest(err.to_string()),
            err => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ShippingError> for ApiError {
    fn from(err: ShippingError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<weft_db::DbError> for ApiError {
    fn from(err: weft_db::DbError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(format!("{err:#}"))
    }
}

/// Serialize a value as a JSON response with the given status.
pub fn json_response<T: Serialize>(status: u16, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => Response::builder()
            .status(status)
            .header("content-type", "application/json")
            .body(body)
            .build(),
        Err(e) => ApiError::Internal(format!("response serialization: {e}")).into_response(),
    }
}

/// Parse a JSON request body, mapping failures to 400.
pub fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

/// Rebuild a response with extra headers appended.
pub fn with_headers(response: Response, extra: &[(&str, &str)]) -> Response {
    let status = *response.status();
    let headers: Vec<(String, String)> = response
        .headers()
        .map(|(k, v)| (k.to_string(), v.as_str().unwrap_or("").to_string()))
        .collect();
    let body = response.into_body();

    let mut builder = Response::builder();
    builder.status(status);
    for (k, v) in &headers {
        builder.header(k.as_str(), v.as_str());
    }
    for (k, v) in extra {
        builder.header(*k, *v);
    }
    builder.body(body).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_code_table() {
        let cases = [
            (ApiError::BadRequest("x".into()), 400, "bad_request"),
            (ApiError::Unauthorized("x".into()), 401, "unauthorized"),
            (ApiError::Forbidden("x".into()), 403, "forbidden"),
            (ApiError::NotFound("x".into()), 404, "not_found"),
            (ApiError::Conflict("x".into()), 409, "conflict"),
            (
                ApiError::RateLimited {
                    retry_after_secs: 30,
                },
                429,
                "rate_limited",
            ),
            (ApiError::Internal("x".into()), 500, "internal_error"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_internal_detail_stays_out_of_the_body() {
        let err = ApiError::Internal("sqlite disk I/O error at /data/store.db".to_string());
        assert!(err.log_message().contains("sqlite"));
        assert!(!err.client_message().contains("sqlite"));

        let response = err.into_response();
        assert_eq!(*response.status(), 500);
        let body = String::from_utf8(response.into_body()).unwrap();
        assert!(body.contains(r#""code":"internal_error""#));
        assert!(!body.contains("sqlite"));
    }

    #[test]
    fn test_envelope_shape() {
        let response = ApiError::NotFound("Order not found: ord_1".to_string()).into_response();
        assert_eq!(*response.status(), 404);
        let body: serde_json::Value =
            serde_json::from_slice(&response.into_body()).unwrap();
        assert_eq!(body["error"]["code"], "not_found");
        assert_eq!(body["error"]["message"], "Order not found: ord_1");
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = ApiError::RateLimited {
            retry_after_secs: 42,
        }
        .into_response();
        assert_eq!(*response.status(), 429);
        let retry = response
            .headers()
            .find(|(k, _)| *k == "retry-after")
            .map(|(_, v)| v.as_str().unwrap_or("").to_string());
        assert_eq!(retry.as_deref(), Some("42"));
    }

    #[test]
    fn test_commerce_error_mapping() {
        let not_found: ApiError = CommerceError::OrderNotFound("ord_1".to_string()).into();
        assert_eq!(not_found.status(), 404);

        let conflict: ApiError = CommerceError::OrderAlreadyProcessed("ORD-1".to_string()).into();
        assert_eq!(conflict.status(), 409);

        let bad: ApiError = CommerceError::InsufficientStock {
            product_id: "prod_1".to_string(),
            requested: 5,
            available: 2,
        }
        .into();
        assert_eq!(bad.status(), 400);

        let internal: ApiError = CommerceError::DatabaseError("locked".to_string()).into();
        assert_eq!(internal.status(), 500);
    }

    #[test]
    fn test_auth_error_mapping() {
        let unauthorized: ApiError = AuthError::InvalidCredentials.into();
        assert_eq!(unauthorized.status(), 401);

        let conflict: ApiError = AuthError::UserAlreadyExists("a@example.com".to_string()).into();
        assert_eq!(conflict.status(), 409);
        // The address itself is not echoed back
        assert!(!conflict.client_message().contains("a@example.com"));

        let forbidden: ApiError = AuthError::InsufficientPermissions.into();
        assert_eq!(forbidden.status(), 403);

        let weak: ApiError = AuthError::WeakPassword("too short".to_string()).into();
        assert_eq!(weak.status(), 400);
    }

    #[test]
    fn test_payment_error_mapping() {
        let bad: ApiError = PaymentError::VerificationFailed.into();
        assert_eq!(bad.status(), 400);

        let gateway: ApiError = PaymentError::GatewayError("timeout".to_string()).into();
        assert_eq!(gateway.status(), 500);
        assert!(!gateway.client_message().contains("timeout"));
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        let result: Result<serde_json::Value, ApiError> = parse_json(b"{not json");
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn test_with_headers_preserves_response() {
        let response = json_response(201, &serde_json::json!({"ok": true}));
        let response = with_headers(
            response,
            &[
                ("x-request-id", "req_1"),
                ("set-cookie", "weft_session=sess_1; Path=/"),
            ],
        );

        assert_eq!(*response.status(), 201);
        let headers: Vec<(String, String)> = response
            .headers()
            .map(|(k, v)| (k.to_string(), v.as_str().unwrap_or("").to_string()))
            .collect();
        assert!(headers
            .iter()
            .any(|(k, v)| k == "set-cookie" && v.starts_with("weft_session=")));
        assert!(headers.iter().any(|(k, v)| k == "x-request-id" && v == "req_1"));
        assert!(headers
            .iter()
            .any(|(k, v)| k == "content-type" && v == "application/json"));
        let body = String::from_utf8(response.into_body()).unwrap();
        assert!(body.contains(r#""ok":true"#));
    }
}
