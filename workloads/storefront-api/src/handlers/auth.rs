//! Account registration, login, and logout.
//!
//! Sessions are anonymous from first contact; these endpoints upgrade and
//! downgrade the caller's existing session rather than minting a new one.
//! On login the guest cart follows the shopper into their account.

use crate::http::{json_response, parse_json, ApiError};
use crate::logging::RequestLogger;
use serde::{Deserialize, Serialize};
use spin_sdk::http::Response;
use weft_auth::{AuthSession, SessionStore, UserRecord, UserStore};
use weft_commerce::prelude::*;

#[derive(Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// The caller-visible slice of an account. Never the stored record.
#[derive(Serialize)]
struct UserView {
    id: String,
    email: String,
    name: Option<String>,
    role: String,
}

impl UserView {
    fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id.clone(),
            email: record.email.clone(),
            name: record.name.clone(),
            role: record.role.clone(),
        }
    }
}

/// `POST /api/auth/register`: create an account and sign the caller in.
pub fn register(
    body: &[u8],
    session: &mut AuthSession,
    sessions: &SessionStore,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    if session.user.is_authenticated() {
        return Err(ApiError::Conflict("already signed in".to_string()));
    }

    let request: RegisterRequest = parse_json(body)?;
    let email = request.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::BadRequest("a valid email is required".to_string()));
    }

    let users = UserStore::open_default()?;
    let record = users.register(&email, request.name, &request.password)?;

    sign_in(session, sessions, &record, logger)?;
    logger.info_with("account registered", &[("user_id", &record.id)]);

    Ok(json_response(
        201,
        &serde_json::json!({ "user": UserView::from_record(&record) }),
    ))
}

/// `POST /api/auth/login`: check credentials and upgrade the session.
pub fn login(
    body: &[u8],
    session: &mut AuthSession,
    sessions: &SessionStore,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    let request: LoginRequest = parse_json(body)?;
    let email = request.email.trim().to_lowercase();

    let users = UserStore::open_default()?;
    let record = users.authenticate(&email, &request.password)?;

    // Re-login over an authenticated session drops the old identity first.
    if session.user.is_authenticated() {
        session.downgrade();
    }
    sign_in(session, sessions, &record, logger)?;
    logger.info_with("login", &[("user_id", &record.id)]);

    Ok(json_response(
        200,
        &serde_json::json!({ "user": UserView::from_record(&record) }),
    ))
}

/// `POST /api/auth/logout`: drop back to an anonymous session.
pub fn logout(
    session: &mut AuthSession,
    sessions: &SessionStore,
) -> Result<Response, ApiError> {
    session.downgrade();
    sessions.save(session)?;

    Ok(json_response(200, &serde_json::json!({ "ok": true })))
}

/// Upgrade the session to this account and claim any guest cart.
fn sign_in(
    session: &mut AuthSession,
    sessions: &SessionStore,
    record: &UserRecord,
    logger: &RequestLogger,
) -> Result<(), ApiError> {
    session.upgrade(record.to_user())?;

    let carts = CartStore::open_default()?;
    let user_id = UserId::new(record.id.clone());
    match carts.merge_on_login(session.id.as_str(), &user_id) {
        Ok(Some(cart)) => {
            session.cart_id = Some(cart.id.clone());
            logger.info_with("cart claimed on login", &[("items", &cart.unique_item_count())]);
        }
        Ok(None) => {}
        // A cart merge failure must not block the login itself.
        Err(e) => logger.warn_with("cart merge failed", &[("error", &e)]),
    }

    sessions.save(session)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anonymous_session() -> (AuthSession, SessionStore) {
        (AuthSession::anonymous(), SessionStore::open_default().unwrap())
    }

    fn logger() -> RequestLogger {
        RequestLogger::new("req_test")
    }

    #[test]
    fn test_register_rejects_bad_email() {
        let (mut session, sessions) = anonymous_session();
        let body = br#"{"email": "not-an-email", "password": "Sturdy1234"}"#;
        let err = register(body, &mut session, &sessions, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(session.user.is_anonymous());
    }

    #[test]
    fn test_register_rejects_weak_password() {
        let (mut session, sessions) = anonymous_session();
        let body = br#"{"email": "asha@example.com", "password": "short"}"#;
        let err = register(body, &mut session, &sessions, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.client_message().contains("password"));
    }

    #[test]
    fn test_register_signs_the_caller_in() {
        // The host-side user store accepts any insert, so registration
        // exercises the whole upgrade path.
        let (mut session, sessions) = anonymous_session();
        let body = br#"{"email": "Asha@Example.com", "password": "Sturdy1234", "name": "Asha"}"#;
        let response = register(body, &mut session, &sessions, &logger()).unwrap();

        assert_eq!(*response.status(), 201);
        assert!(session.user.is_authenticated());
        // Email was normalized before storage
        assert_eq!(session.user.email(), Some("asha@example.com"));

        let parsed: serde_json::Value = serde_json::from_slice(&response.into_body()).unwrap();
        assert_eq!(parsed["user"]["email"], "asha@example.com");
        assert_eq!(parsed["user"]["role"], "customer");
        assert!(parsed["user"].get("password_hash").is_none());
    }

    #[test]
    fn test_register_conflicts_when_already_signed_in() {
        let (mut session, sessions) = anonymous_session();
        let body = br#"{"email": "a@example.com", "password": "Sturdy1234"}"#;
        register(body, &mut session, &sessions, &logger()).unwrap();

        let err = register(body, &mut session, &sessions, &logger()).unwrap_err();
        assert_eq!(err.status(), 409);
    }

    #[test]
    fn test_login_unknown_email_is_unauthorized() {
        // Host-side lookups find no user.
        let (mut session, sessions) = anonymous_session();
        let body = br#"{"email": "nobody@example.com", "password": "Whatever123"}"#;
        let err = login(body, &mut session, &sessions, &logger()).unwrap_err();
        assert_eq!(err.status(), 401);
        assert!(session.user.is_anonymous());
    }

    #[test]
    fn test_logout_downgrades_to_anonymous() {
        let (mut session, sessions) = anonymous_session();
        let body = br#"{"email": "a@example.com", "password": "Sturdy1234"}"#;
        register(body, &mut session, &sessions, &logger()).unwrap();
        assert!(session.user.is_authenticated());

        let response = logout(&mut session, &sessions).unwrap();
        assert_eq!(*response.status(), 200);
        assert!(session.user.is_anonymous());
        assert_eq!(session.cart_id, None);
    }
}
