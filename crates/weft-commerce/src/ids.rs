//! Newtype IDs for type-safe identifiers.
//!
//! Newtypes prevent accidentally mixing up different ID types, e.g. passing
//! a ProductId where a VariantId is expected. Generated ids carry a short
//! prefix so a bare string in a log line is still attributable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate newtype ID structs with a generation prefix.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        /// A unique identifier.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new unique ID.
            pub fn generate() -> Self {
                Self(generate_id($prefix))
            }

            /// Get the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Define all ID types
define_id!(ProductId, "prod");
define_id!(VariantId, "var");
define_id!(CategoryId, "cat");
define_id!(MediaId, "media");
define_id!(CartId, "cart");
define_id!(LineItemId, "item");
define_id!(OrderId, "order");
define_id!(OrderItemId, "oitem");
define_id!(UserId, "user");
define_id!(SubmissionId, "msg");
define_id!(AuditLogId, "audit");

/// Generate a prefixed unique ID from the clock and a random word.
fn generate_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let entropy: u64 = rand::random();

    format!("{}_{:011x}{:08x}", prefix, timestamp, entropy as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = ProductId::new("prod_123");
        assert_eq!(id.as_str(), "prod_123");
    }

    #[test]
    fn test_id_generation_is_unique_and_prefixed() {
        let id1 = OrderId::generate();
        let id2 = OrderId::generate();
        assert_ne!(id1, id2);
        assert!(id1.as_str().starts_with("order_"));
    }

    #[test]
    fn test_id_from_string() {
        let id: ProductId = "prod_456".into();
        assert_eq!(id.as_str(), "prod_456");
    }

    #[test]
    fn test_id_display() {
        let id = CartId::new("cart_789");
        assert_eq!(format!("{}", id), "cart_789");
    }

    #[test]
    fn test_id_equality() {
        let id1 = ProductId::new("same");
        let id2 = ProductId::new("same");
        let id3 = ProductId::new("different");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }
}
