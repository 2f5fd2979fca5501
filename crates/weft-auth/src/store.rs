//! User persistence and credential checks.

use crate::password::{hash_password, validate_password, verify_password};
use crate::user::UserRecord;
use crate::AuthError;
use weft_commerce::ids::UserId;
use weft_db::{params, Db};

/// Users stored as SQLite rows.
pub struct UserStore {
    db: Db,
}

impl UserStore {
    /// Open over the default database.
    pub fn open_default() -> Result<Self, AuthError> {
        Ok(Self {
            db: Db::open_default()?,
        })
    }

    /// Wrap an already-open database handle.
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Register a new user: validates the password, hashes it, inserts.
    pub fn register(
        &self,
        email: &str,
        name: Option<String>,
        password: &str,
    ) -> Result<UserRecord, AuthError> {
        validate_password(password)?;

        if self.find_by_email(email)?.is_some() {
            return Err(AuthError::UserAlreadyExists(email.to_string()));
        }

        let record = UserRecord::new(
            UserId::generate().into_inner(),
            email,
            name,
            hash_password(password)?,
        );

        self.db.execute(
            "INSERT INTO users (id, email, name, role, password_hash, failed_attempts, locked_until, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                record.id.clone(),
                record.email.clone(),
                record.name.clone(),
                record.role.clone(),
                record.password_hash.clone(),
                record.failed_attempts,
                record.locked_until,
                record.created_at,
                record.updated_at
            ],
        )?;

        Ok(record)
    }

    /// Check credentials, tracking failed attempts and lockout.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<UserRecord, AuthError> {
        let Some(mut record) = self.find_by_email(email)? else {
            // Burn a verification anyway so missing and wrong cost the same.
            let _ = verify_password(password, DUMMY_HASH);
            return Err(AuthError::InvalidCredentials);
        };

        if record.is_locked() {
            return Err(AuthError::AccountLocked);
        }

        if !verify_password(password, &record.password_hash)? {
            record.record_failed_attempt();
            self.save_lockout(&record)?;
            return Err(AuthError::InvalidCredentials);
        }

        if record.failed_attempts > 0 {
            record.reset_failed_attempts();
            self.save_lockout(&record)?;
        }

        Ok(record)
    }

    /// Find a user by email.
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.db.query_optional(
            "SELECT id, email, name, role, password_hash, failed_attempts, locked_until, created_at, updated_at
             FROM users WHERE email = ?",
            params![email],
        )?)
    }

    /// Find a user by id.
    pub fn find_by_id(&self, id: &str) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.db.query_optional(
            "SELECT id, email, name, role, password_hash, failed_attempts, locked_until, created_at, updated_at
             FROM users WHERE id = ?",
            params![id],
        )?)
    }

    fn save_lockout(&self, record: &UserRecord) -> Result<(), AuthError> {
        self.db.execute(
            "UPDATE users SET failed_attempts = ?, locked_until = ?, updated_at = ? WHERE id = ?",
            params![
                record.failed_attempts,
                record.locked_until,
                record.updated_at,
                record.id.clone()
            ],
        )?;
        Ok(())
    }
}

// A valid Argon2 hash of a throwaway string, verified against when the
// email does not exist.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$MTIzNDU2Nzg5MDEyMzQ1Ng$qLml5cdM2aL+qYHAp2kTHXfsWXEDV5xewZ45sWwdEmM";
