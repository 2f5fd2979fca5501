//! Append-only audit log entries.

use crate::ids::{AuditLogId, OrderId, UserId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A row in the append-only audit log. Entries are written, never updated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditLogEntry {
    /// Unique entry identifier.
    pub id: AuditLogId,
    /// User the action is attributed to.
    pub actor: UserId,
    /// Dotted action name (e.g., "payment.verified").
    pub action: String,
    /// Kind of entity acted on.
    pub entity_type: String,
    /// Id of the entity acted on.
    pub entity_id: String,
    /// Action-specific details.
    pub details: serde_json::Value,
    /// Unix timestamp of the event.
    pub created_at: i64,
}

impl AuditLogEntry {
    /// Record a successful payment verification against an order.
    pub fn payment_verified(
        actor: UserId,
        order_id: &OrderId,
        payment_reference: &str,
        amount: Money,
    ) -> Self {
        Self {
            id: AuditLogId::generate(),
            actor,
            action: "payment.verified".to_string(),
            entity_type: "order".to_string(),
            entity_id: order_id.as_str().to_string(),
            details: serde_json::json!({
                "payment_reference": payment_reference,
                "amount": amount.to_decimal(),
                "currency": amount.currency.code(),
            }),
            created_at: current_timestamp(),
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
    use crate::money::Currency;

    #[test]
    fn test_payment_verified_entry() {
        let entry = AuditLogEntry::payment_verified(
            UserId::new("user_1"),
            &OrderId::new("order_9"),
            "pay_abc123",
            Money::new(269500, Currency::INR),
        );

        assert_eq!(entry.action, "payment.verified");
        assert_eq!(entry.entity_type, "order");
        assert_eq!(entry.entity_id, "order_9");
        assert_eq!(entry.details["payment_reference"], "pay_abc123");
        assert_eq!(entry.details["amount"], 2695.0);
        assert_eq!(entry.details["currency"], "INR");
    }
}
