//! Contact form intake.

use crate::http::{json_response, parse_json, ApiError};
use crate::logging::RequestLogger;
use serde::Deserialize;
use spin_sdk::http::Response;
use weft_commerce::prelude::*;

#[derive(Deserialize)]
struct ContactRequest {
    first_name: String,
    last_name: String,
    email: String,
    #[serde(default)]
    phone: Option<String>,
    category: String,
    message: String,
}

/// `POST /api/contact`: record a customer message. Open to anonymous
/// visitors; the rate tier is the real gate here.
pub fn submit(body: &[u8], logger: &RequestLogger) -> Result<Response, ApiError> {
    let request: ContactRequest = parse_json(body)?;

    let mut submission = ContactSubmission::new(
        request.first_name,
        request.last_name,
        request.email,
        request.category,
        request.message,
    );
    submission.phone = request.phone;

    ContactStore::open_default()?.submit(&submission)?;

    logger.info_with(
        "contact submission received",
        &[("category", &submission.category)],
    );
    // Owner notifications are logged in place of delivery; there is no
    // outbound mail or WhatsApp integration.
    logger.info_with(
        "owner notification (log only)",
        &[("via", &"email,whatsapp"), ("from", &submission.email)],
    );

    Ok(json_response(201, &serde_json::json!({ "id": submission.id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> RequestLogger {
        RequestLogger::new("req_test")
    }

    #[test]
    fn test_valid_submission_is_created() {
        let body = br#"{
            "first_name": "Asha",
            "last_name": "Nair",
            "email": "asha@example.com",
            "category": "wholesale",
            "message": "Do you offer bulk pricing on the kanchipuram line?"
        }"#;
        let response = submit(body, &logger()).unwrap();
        assert_eq!(*response.status(), 201);
        let body = String::from_utf8(response.into_body()).unwrap();
        assert!(body.contains("\"id\""));
    }

    #[test]
    fn test_blank_message_is_rejected() {
        let body = br#"{
            "first_name": "Asha",
            "last_name": "Nair",
            "email": "asha@example.com",
            "category": "general",
            "message": "   "
        }"#;
        let err = submit(body, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_mangled_email_is_rejected() {
        let body = br#"{
            "first_name": "Asha",
            "last_name": "Nair",
            "email": "not-an-email",
            "category": "general",
            "message": "hello"
        }"#;
        let err = submit(body, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
    }

    #[test]
    fn test_missing_fields_are_bad_request() {
        let err = submit(br#"{"first_name": "Asha"}"#, &logger()).unwrap_err();
        assert_eq!(err.status(), 400);
    }
}
