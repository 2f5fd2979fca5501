//! Request dispatch: session resolution, rate limiting, and the route table.

use crate::handlers::{admin, auth, cart, catalog, checkout, contact, orders, payments};
use crate::http::{self, ApiError};
use crate::identity;
use crate::logging::{generate_request_id, RequestLogger};
use crate::migrate;
use spin_sdk::http::{Method, Request, Response};
use weft_auth::SessionStore;
use weft_cache::{RateLimit, RateLimiter};
use weft_db::Db;

/// Route one request end to end and produce the response, error envelope
/// included. Every response carries an `x-request-id`; first-contact
/// responses also carry the session cookie.
pub async fn dispatch(req: Request) -> Response {
    let request_id = generate_request_id();
    let logger = RequestLogger::new(request_id.as_str())
        .with_method(format!("{:?}", req.method()))
        .with_route(req.path());

    let mut set_cookie: Option<String> = None;
    let response = match route(&req, &mut set_cookie, &logger).await {
        Ok(response) => response,
        Err(err) => {
            if err.status() >= 500 {
                logger.error(&err.log_message());
            } else {
                logger.warn(&err.log_message());
            }
            err.into_response()
        }
    };

    logger.info_with("request complete", &[("status", response.status())]);

    let mut extra: Vec<(&str, &str)> = vec![("x-request-id", &request_id)];
    if let Some(cookie) = set_cookie.as_deref() {
        extra.push(("set-cookie", cookie));
    }
    http::with_headers(response, &extra)
}

async fn route(
    req: &Request,
    set_cookie: &mut Option<String>,
    logger: &RequestLogger,
) -> Result<Response, ApiError> {
    let db = Db::open_default()?;
    migrate::ensure_schema(&db)?;

    let path = req.path();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    enforce_rate_limit(req, &segments, logger)?;

    let sessions = SessionStore::open_default()?;
    let (mut session, created_cookie) = identity::resolve_session(&sessions, req)?;
    *set_cookie = created_cookie;

    match (req.method(), segments.as_slice()) {
        // Catalog, open to everyone
        (Method::Get, ["api", "products"]) => catalog::list_products(req.query()),
        (Method::Get, ["api", "products", slug]) => catalog::product_detail(slug),
        (Method::Get, ["api", "categories"]) => catalog::list_categories(),

        // Accounts
        (Method::Post, ["api", "auth", "register"]) => {
            auth::register(req.body(), &mut session, &sessions, logger)
        }
        (Method::Post, ["api", "auth", "login"]) => {
            auth::login(req.body(), &mut session, &sessions, logger)
        }
        (Method::Post, ["api", "auth", "logout"]) => auth::logout(&mut session, &sessions),

        // Cart
        (Method::Get, ["api", "cart"]) => cart::get_cart(&session),
        (Method::Post, ["api", "cart", "items"]) => cart::add_item(req.body(), &session),
        (Method::Patch, ["api", "cart", "items", id]) => {
            cart::update_item(req.body(), &session, id)
        }
        (Method::Delete, ["api", "cart", "items", id]) => cart::remove_item(&session, id),
        (Method::Delete, ["api", "cart"]) => cart::clear(&session),

        // Checkout and payment
        (Method::Post, ["api", "checkout"]) => checkout::place_order(req.body(), &session, logger),
        (Method::Post, ["api", "payments", "create-intent"]) => {
            payments::create_intent(req.body(), &session, logger).await
        }
        (Method::Post, ["api", "payments", "verify"]) => {
            payments::verify(req.body(), &session, logger)
        }

        // Order history
        (Method::Get, ["api", "orders"]) => orders::list(&session),
        (Method::Get, ["api", "orders", id]) => orders::detail(id, &session),
        (Method::Get, ["api", "orders", id, "tracking"]) => {
            orders::tracking(id, &session, logger).await
        }

        // Contact
        (Method::Post, ["api", "contact"]) => contact::submit(req.body(), logger),

        // Back office
        (Method::Get, ["api", "admin", "orders"]) => admin::list_orders(&session),
        (Method::Patch, ["api", "admin", "orders", id]) => {
            admin::update_order(id, req.body(), &session, logger)
        }
        (Method::Get, ["api", "admin", "contact"]) => admin::list_contact(&session),

        _ => Err(ApiError::NotFound("no such route".to_string())),
    }
}

/// Pick the tier for a route and apply it. A broken limiter store fails
/// open; a denied request becomes 429 before any handler runs.
fn enforce_rate_limit(
    req: &Request,
    segments: &[&str],
    logger: &RequestLogger,
) -> Result<(), ApiError> {
    let tier = tier_for(req.method(), segments);
    let identifier = identity::client_identifier(req);

    match RateLimiter::open_default().and_then(|limiter| limiter.check(&tier, &identifier)) {
        Ok(decision) if !decision.allowed => {
            logger.warn_with(
                "rate limit exceeded",
                &[("scope", &tier.scope), ("identifier", &identifier)],
            );
            Err(ApiError::RateLimited {
                retry_after_secs: decision.retry_after_secs,
            })
        }
        Ok(_) => Ok(()),
        Err(e) => {
            logger.warn_with("rate limiter unavailable, failing open", &[("error", &e)]);
            Ok(())
        }
    }
}

fn tier_for(method: &Method, segments: &[&str]) -> RateLimit {
    match (method, segments) {
        (Method::Post, ["api", "auth", "register" | "login"]) => RateLimit::AUTH,
        (_, ["api", "payments", ..]) => RateLimit::PAYMENT,
        (Method::Post | Method::Patch | Method::Delete, ["api", "cart", ..]) => RateLimit::CART,
        (Method::Post, ["api", "contact"]) => RateLimit::CONTACT,
        _ => RateLimit::API,
    }
}
