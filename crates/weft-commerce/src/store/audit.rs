//! Audit log repository. Append-only.

use crate::audit::AuditLogEntry;
use crate::error::CommerceError;
use weft_db::{params, Db};

/// Writer for the audit trail. Entries are never updated or deleted.
pub struct AuditStore {
    db: Db,
}

impl AuditStore {
    /// Open over the default database.
    pub fn open_default() -> Result<Self, CommerceError> {
        Ok(Self {
            db: Db::open_default()?,
        })
    }

    /// Wrap an already-open database handle.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Append an entry to the trail.
    pub fn append(&self, entry: &AuditLogEntry) -> Result<(), CommerceError> {
        let details = serde_json::to_string(&entry.details)?;
        self.db.execute(
            "INSERT INTO audit_logs (id, actor, action, entity_type, entity_id, details,
                                     created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id.as_str(),
                entry.actor.as_str(),
                entry.action.as_str(),
                entry.entity_type.as_str(),
                entry.entity_id.as_str(),
                details.as_str(),
                entry.created_at
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{OrderId, UserId};
    use crate::money::{Currency, Money};

    #[test]
    fn test_append_payment_entry() {
        let store = AuditStore::open_default().unwrap();
        let entry = AuditLogEntry::payment_verified(
            UserId::new("user_1"),
            &OrderId::new("order_1"),
            "pay_abc",
            Money::new(269500, Currency::INR),
        );
        assert!(store.append(&entry).is_ok());
    }
}
