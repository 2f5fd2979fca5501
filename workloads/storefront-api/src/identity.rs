//! Who is calling: session cookie and rate-limit identity.

use crate::http::ApiError;
use spin_sdk::http::Request;
use weft_auth::{AuthSession, SessionId, SessionStore};

/// Session cookie name.
pub const SESSION_COOKIE: &str = "weft_session";

/// Identify a client for rate limiting: the best available client IP plus
/// a slice of the user agent, so shared NATs don't pool into one bucket.
pub fn client_identifier(req: &Request) -> String {
    let ip = client_ip(req).unwrap_or_else(|| "unknown".to_string());
    let agent = header(req, "user-agent").unwrap_or_default();
    let agent: String = agent.chars().take(50).collect();
    format!("{}-{}", ip, agent)
}

/// The client IP as reported by the proxy chain, if any.
pub fn client_ip(req: &Request) -> Option<String> {
    header(req, "x-forwarded-for")
        .map(|v| v.split(',').next().unwrap_or("").trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| header(req, "x-real-ip"))
        .or_else(|| header(req, "cf-connecting-ip"))
}

/// Extract the session id from the Cookie header.
pub fn session_cookie(req: &Request) -> Option<String> {
    let cookies = header(req, "cookie")?;
    for pair in cookies.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Set-Cookie value for a live session.
pub fn session_cookie_value(session: &AuthSession) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        session.id,
        AuthSession::DEFAULT_DURATION_SECS
    )
}

/// Load the caller's session, creating an anonymous one on first contact.
///
/// Returns the session and, when one was just created, the Set-Cookie
/// value the response must carry.
pub fn resolve_session(
    sessions: &SessionStore,
    req: &Request,
) -> Result<(AuthSession, Option<String>), ApiError> {
    if let Some(id) = session_cookie(req) {
        if let Some(session) = sessions.load(&SessionId::from(id))? {
            return Ok((session, None));
        }
    }

    let mut session = AuthSession::anonymous();
    if let Some(ip) = client_ip(req) {
        session = session.with_ip(ip);
    }
    if let Some(agent) = header(req, "user-agent") {
        session = session.with_user_agent(agent);
    }
    sessions.save(&session)?;

    let cookie = session_cookie_value(&session);
    Ok((session, Some(cookie)))
}

fn header(req: &Request, name: &str) -> Option<String> {
    req.header(name)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}
