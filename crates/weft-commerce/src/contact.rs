//! Contact form submissions.

use crate::error::CommerceError;
use crate::ids::SubmissionId;
use crate::validate::{is_valid_email, require_field};
use serde::{Deserialize, Serialize};

/// A contact form submission.
///
/// Submissions are persisted for the back-office; outbound notifications
/// are logged, not delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactSubmission {
    /// Unique submission identifier.
    pub id: SubmissionId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    /// What the message is about (e.g., "order", "wholesale", "general").
    pub category: String,
    pub message: String,
    /// Unix timestamp of submission.
    pub created_at: i64,
}

impl ContactSubmission {
    /// Create a new submission.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: SubmissionId::generate(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
            category: category.into(),
            message: message.into(),
            created_at: current_timestamp(),
        }
    }

    /// Validate required fields and the email shape.
    pub fn validate(&self) -> Result<(), CommerceError> {
        require_field(&self.first_name, "first_name")?;
        require_field(&self.last_name, "last_name")?;
        require_field(&self.email, "email")?;
        require_field(&self.category, "category")?;
        require_field(&self.message, "message")?;

        if !is_valid_email(&self.email) {
            return Err(CommerceError::ValidationError(
                "email is not a valid address".to_string(),
            ));
        }
        Ok(())
    }

    /// Sender display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Get current Unix timestamp.
fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_submission() {
        let submission = ContactSubmission::new(
            "Ravi",
            "Menon",
            "ravi@example.com",
            "wholesale",
            "Do you offer bulk pricing on stoles?",
        );
        assert!(submission.validate().is_ok());
        assert_eq!(submission.full_name(), "Ravi Menon");
        assert!(submission.id.as_str().starts_with("msg_"));
    }

    #[test]
    fn test_missing_message_rejected() {
        let submission = ContactSubmission::new("Ravi", "Menon", "ravi@example.com", "general", "");
        let err = submission.validate().unwrap_err();
        assert!(err.to_string().contains("message"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let submission =
            ContactSubmission::new("Ravi", "Menon", "not-an-email", "general", "Hello");
        assert!(submission.validate().is_err());
    }
}
