//! Field validation helpers shared by checkout and contact forms.

use crate::error::CommerceError;

/// Reject blank required fields with a field-named validation error.
pub(crate) fn require_field(value: &str, name: &str) -> Result<(), CommerceError> {
    if value.trim().is_empty() {
        return Err(CommerceError::ValidationError(format!("{name} is required")));
    }
    Ok(())
}

/// Shape check only: one `@`, non-empty local part, dotted domain.
/// Deliverability is the mail server's problem.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

/// Indian PIN codes are exactly six digits.
pub(crate) fn is_valid_postal_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field() {
        assert!(require_field("Asha", "first_name").is_ok());
        assert!(require_field("   ", "first_name").is_err());
        assert!(require_field("", "first_name").is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("asha@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co.in"));

        assert!(!is_valid_email("asha"));
        assert!(!is_valid_email("asha@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("asha@example"));
        assert!(!is_valid_email("asha@.com"));
        assert!(!is_valid_email("asha@example.com@twice"));
    }

    #[test]
    fn test_postal_code() {
        assert!(is_valid_postal_code("110001"));
        assert!(!is_valid_postal_code("11000"));
        assert!(!is_valid_postal_code("1100011"));
        assert!(!is_valid_postal_code("11000a"));
    }
}
