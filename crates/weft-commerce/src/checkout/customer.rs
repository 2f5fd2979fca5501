//! Customer and profile snapshots.

use crate::error::CommerceError;
use crate::ids::UserId;
use crate::validate::{is_valid_email, is_valid_postal_code, require_field};
use serde::{Deserialize, Serialize};

/// Customer and shipping details captured at checkout.
///
/// This is a snapshot: it is denormalized onto the order and never re-read
/// from the profile, so later address edits don't rewrite order history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl CustomerInfo {
    /// Validate required fields, email shape, and the PIN code.
    pub fn validate(&self) -> Result<(), CommerceError> {
        require_field(&self.first_name, "first_name")?;
        require_field(&self.last_name, "last_name")?;
        require_field(&self.email, "email")?;
        require_field(&self.phone, "phone")?;
        require_field(&self.address_line1, "address_line1")?;
        require_field(&self.city, "city")?;
        require_field(&self.state, "state")?;
        require_field(&self.postal_code, "postal_code")?;

        if !is_valid_email(&self.email) {
            return Err(CommerceError::ValidationError(
                "email is not a valid address".to_string(),
            ));
        }
        if !is_valid_postal_code(&self.postal_code) {
            return Err(CommerceError::ValidationError(
                "postal_code must be a 6-digit PIN".to_string(),
            ));
        }
        Ok(())
    }

    /// Get full name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Format the address as a single line.
    pub fn address_one_line(&self) -> String {
        let mut parts = vec![self.address_line1.clone()];
        if let Some(ref line2) = self.address_line2 {
            parts.push(line2.clone());
        }
        parts.push(self.city.clone());
        parts.push(self.state.clone());
        parts.push(self.postal_code.clone());
        parts.join(", ")
    }
}

/// A user's saved shipping details, refreshed best-effort from each checkout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: UserId,
    pub phone: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub updated_at: i64,
}

impl Profile {
    /// Build a profile row from a checkout snapshot.
    pub fn from_customer(user_id: UserId, customer: &CustomerInfo) -> Self {
        Self {
            user_id,
            phone: Some(customer.phone.clone()),
            address_line1: Some(customer.address_line1.clone()),
            address_line2: customer.address_line2.clone(),
            city: Some(customer.city.clone()),
            state: Some(customer.state.clone()),
            postal_code: Some(customer.postal_code.clone()),
            country: Some(customer.country.clone()),
            updated_at: current_timestamp(),
        }
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

    fn sample() -> CustomerInfo {
        CustomerInfo {
            first_name: "Asha".to_string(),
            last_name: "Nair".to_string(),
            email: "asha@example.com".to_string(),
            phone: "+91 98765 43210".to_string(),
            address_line1: "14 Temple Road".to_string(),
            address_line2: None,
            city: "Kochi".to_string(),
            state: "Kerala".to_string(),
            postal_code: "682001".to_string(),
            country: "India".to_string(),
        }
    }

    #[test]
    fn test_valid_customer() {
        assert!(sample().validate().is_ok());
        assert_eq!(sample().full_name(), "Asha Nair");
    }

    #[test]
    fn test_missing_required_field() {
        let mut info = sample();
        info.city = "  ".to_string();
        let err = info.validate().unwrap_err();
        assert!(err.to_string().contains("city"));
    }

    #[test]
    fn test_bad_email_rejected() {
        let mut info = sample();
        info.email = "asha-at-example".to_string();
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_bad_pin_rejected() {
        let mut info = sample();
        info.postal_code = "6820".to_string();
        assert!(info.validate().is_err());
    }

    #[test]
    fn test_profile_from_customer() {
        let profile = Profile::from_customer(UserId::new("user_1"), &sample());
        assert_eq!(profile.city.as_deref(), Some("Kochi"));
        assert_eq!(profile.postal_code.as_deref(), Some("682001"));
    }
}
