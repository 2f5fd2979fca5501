//! User types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use weft_commerce::ids::UserId;

/// User role for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer.
    #[default]
    Customer,
    /// Store staff who can review orders and contact submissions.
    Staff,
    /// Store administrator.
    Admin,
}

impl Role {
    /// Get role as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
            Role::Admin => "admin",
        }
    }

    /// Check if this role has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.level() >= required.level()
    }

    /// Get permission level (higher = more permissions).
    pub fn level(&self) -> u8 {
        match self {
            Role::Customer => 0,
            Role::Staff => 1,
            Role::Admin => 2,
        }
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            _ => Err(()),
        }
    }
}

/// The identity attached to a session.
///
/// Anonymous shoppers are first-class: their session id owns a cart just
/// like a user id does.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum User {
    /// Anonymous/guest shopper tracked by session.
    Anonymous {
        /// Session identifier.
        session_id: String,
    },
    /// Authenticated user.
    Authenticated {
        /// User ID.
        id: UserId,
        /// Email address.
        email: String,
        /// Display name.
        name: Option<String>,
        /// Role for authorization.
        role: Role,
    },
}

impl User {
    /// Create a new anonymous user.
    pub fn anonymous(session_id: impl Into<String>) -> Self {
        User::Anonymous {
            session_id: session_id.into(),
        }
    }

    /// Create a new authenticated user.
    pub fn authenticated(
        id: UserId,
        email: impl Into<String>,
        name: Option<String>,
        role: Role,
    ) -> Self {
        User::Authenticated {
            id,
            email: email.into(),
            name,
            role,
        }
    }

    /// Check if user is authenticated.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, User::Authenticated { .. })
    }

    /// Check if user is anonymous.
    pub fn is_anonymous(&self) -> bool {
        matches!(self, User::Anonymous { .. })
    }

    /// Get user ID if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            User::Authenticated { id, .. } => Some(id),
            User::Anonymous { .. } => None,
        }
    }

    /// Get email if authenticated.
    pub fn email(&self) -> Option<&str> {
        match self {
            User::Authenticated { email, .. } => Some(email),
            User::Anonymous { .. } => None,
        }
    }

    /// The identity string that owns this user's cart: the user id when
    /// authenticated, the session token otherwise.
    pub fn cart_identity(&self) -> &str {
        match self {
            User::Authenticated { id, .. } => id.as_str(),
            User::Anonymous { session_id } => session_id,
        }
    }

    /// Get role; anonymous users have no grants.
    pub fn role(&self) -> Option<Role> {
        match self {
            User::Authenticated { role, .. } => Some(*role),
            User::Anonymous { .. } => None,
        }
    }

    /// Check if user has at least the given permission level.
    pub fn has_permission(&self, required: Role) -> bool {
        self.role().is_some_and(|r| r.has_permission(required))
    }
}

/// A stored user row: identity plus credentials and lockout state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// User ID.
    pub id: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: Option<String>,
    /// Role string ("customer", "staff", "admin").
    pub role: String,
    /// Argon2 password hash.
    pub password_hash: String,
    /// Number of failed login attempts.
    pub failed_attempts: i64,
    /// Unix timestamp the account is locked until, if locked.
    pub locked_until: Option<i64>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    pub updated_at: i64,
}

impl UserRecord {
    /// Lock after this many consecutive failures.
    pub const MAX_FAILED_ATTEMPTS: i64 = 5;
    /// Lock duration: 15 minutes.
    pub const LOCK_DURATION_SECS: i64 = 15 * 60;

    /// Create a new record with a hashed password.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: Option<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        let now = current_timestamp();
        Self {
            id: id.into(),
            email: email.into(),
            name,
            role: Role::Customer.as_str().to_string(),
            password_hash: password_hash.into(),
            failed_attempts: 0,
            locked_until: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse the stored role, defaulting to customer on unknown values.
    pub fn parsed_role(&self) -> Role {
        self.role.parse().unwrap_or_default()
    }

    /// Check if the account is currently locked.
    pub fn is_locked(&self) -> bool {
        self.locked_until
            .is_some_and(|until| current_timestamp() < until)
    }

    /// Record a failed login attempt, locking after the threshold.
    pub fn record_failed_attempt(&mut self) {
        self.failed_attempts += 1;
        self.updated_at = current_timestamp();

        if self.failed_attempts >= Self::MAX_FAILED_ATTEMPTS {
            self.locked_until = Some(current_timestamp() + Self::LOCK_DURATION_SECS);
        }
    }

    /// Reset failed attempts on successful login.
    pub fn reset_failed_attempts(&mut self) {
        self.failed_attempts = 0;
        self.locked_until = None;
        self.updated_at = current_timestamp();
    }

    /// Build the session identity for this record.
    pub fn to_user(&self) -> User {
        User::authenticated(
            UserId::new(self.id.clone()),
            self.email.clone(),
            self.name.clone(),
            self.parsed_role(),
        )
    }
}

fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
