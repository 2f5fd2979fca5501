//! Contact submission repository.

use crate::contact::ContactSubmission;
use crate::error::CommerceError;
use crate::ids::SubmissionId;
use serde::Deserialize;
use weft_db::{params, Db};

/// Persistence for contact form submissions.
pub struct ContactStore {
    db: Db,
}

impl ContactStore {
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

    /// Validate and store a submission.
    pub fn submit(&self, submission: &ContactSubmission) -> Result<(), CommerceError> {
        submission.validate()?;
        self.db.execute(
            "INSERT INTO contact_submissions (id, first_name, last_name, email, phone,
                                              category, message, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                submission.id.as_str(),
                submission.first_name.as_str(),
                submission.last_name.as_str(),
                submission.email.as_str(),
                submission.phone.clone(),
                submission.category.as_str(),
                submission.message.as_str(),
                submission.created_at
            ],
        )?;
        Ok(())
    }

    /// List all submissions, newest first. Back-office use.
    pub fn list(&self) -> Result<Vec<ContactSubmission>, CommerceError> {
        let rows: Vec<SubmissionRow> = self.db.query_as(
            "SELECT id, first_name, last_name, email, phone, category, message, created_at
             FROM contact_submissions ORDER BY created_at DESC",
            &[],
        )?;
        Ok(rows.into_iter().map(SubmissionRow::into_submission).collect())
    }
}

#[derive(Debug, Deserialize)]
struct SubmissionRow {
    id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone: Option<String>,
    category: String,
    message: String,
    created_at: i64,
}

impl SubmissionRow {
    fn into_submission(self) -> ContactSubmission {
        ContactSubmission {
            id: SubmissionId::new(self.id),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            category: self.category,
            message: self.message,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_validates_first() {
        let store = ContactStore::open_default().unwrap();
        let submission = ContactSubmission::new(
            "Asha",
            "Nair",
            "not-an-email",
            "wholesale",
            "Do you ship bulk orders to Kochi?",
        );
        assert!(matches!(
            store.submit(&submission),
            Err(CommerceError::ValidationError(_))
        ));
    }

    #[test]
    fn test_submit_accepts_valid() {
        let store = ContactStore::open_default().unwrap();
        let mut submission = ContactSubmission::new(
            "Asha",
            "Nair",
            "asha@example.com",
            "wholesale",
            "Do you ship bulk orders to Kochi?",
        );
        submission.phone = Some("+91 98765 43210".to_string());
        assert!(store.submit(&submission).is_ok());
    }
}
