//! Session management over the Key-Value store.

use crate::user::{Role, User};
use crate::AuthError;
use serde::{Deserialize, Serialize};
use weft_cache::{cache_key, Cache};
use weft_commerce::ids::{CartId, UserId};

/// Session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new cryptographically secure session ID.
    pub fn generate() -> Self {
        Self(secure_token("sess"))
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A session: anonymous from first contact, upgraded on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// Session ID.
    pub id: SessionId,
    /// The user (anonymous or authenticated).
    pub user: User,
    /// Associated cart ID, once one exists.
    pub cart_id: Option<CartId>,
    /// CSRF token for form protection.
    pub csrf_token: String,
    /// IP address that created the session.
    pub ip_address: Option<String>,
    /// User agent that created the session.
    pub user_agent: Option<String>,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last activity.
    pub last_activity_at: i64,
    /// Unix timestamp when session expires.
    pub expires_at: i64,
}

impl AuthSession {
    /// Default session duration: 7 days.
    pub const DEFAULT_DURATION_SECS: i64 = 7 * 24 * 60 * 60;

    /// Create a new session for an anonymous shopper.
    pub fn anonymous() -> Self {
        let now = current_timestamp();
        let session_id = SessionId::generate();
        let session_id_str = session_id.as_str().to_string();

        Self {
            id: session_id,
            user: User::anonymous(session_id_str),
            cart_id: None,
            csrf_token: secure_token("csrf"),
            ip_address: None,
            user_agent: None,
            created_at: now,
            last_activity_at: now,
            expires_at: now + Self::DEFAULT_DURATION_SECS,
        }
    }

    /// Set IP address.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Set user agent.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Check if session is expired.
    pub fn is_expired(&self) -> bool {
        current_timestamp() > self.expires_at
    }

    /// Check whether the session has been idle past `timeout_secs`.
    pub fn is_inactive(&self, timeout_secs: i64) -> bool {
        current_timestamp() - self.last_activity_at > timeout_secs
    }

    /// Update last activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity_at = current_timestamp();
    }

    /// Extend session expiration from now.
    pub fn extend(&mut self, duration_secs: i64) {
        self.expires_at = current_timestamp() + duration_secs;
        self.touch();
    }

    /// Verify CSRF token.
    pub fn verify_csrf(&self, token: &str) -> Result<(), AuthError> {
        if self.csrf_token == token {
            Ok(())
        } else {
            Err(AuthError::CsrfMismatch)
        }
    }

    /// Regenerate CSRF token.
    pub fn regenerate_csrf(&mut self) {
        self.csrf_token = secure_token("csrf");
    }

    /// Upgrade an anonymous session to an authenticated one.
    pub fn upgrade(&mut self, user: User) -> Result<(), AuthError> {
        if !self.user.is_anonymous() {
            return Err(AuthError::Internal(
                "Session already authenticated".to_string(),
            ));
        }
        self.user = user;
        self.regenerate_csrf();
        self.touch();
        Ok(())
    }

    /// Drop back to anonymous on logout, keeping the same session id.
    pub fn downgrade(&mut self) {
        self.user = User::anonymous(self.id.as_str().to_string());
        self.cart_id = None;
        self.regenerate_csrf();
        self.touch();
    }

    /// Require an authenticated caller.
    pub fn require_user(&self) -> Result<&UserId, AuthError> {
        self.user.user_id().ok_or(AuthError::InvalidCredentials)
    }

    /// Require at least the given role.
    pub fn require_role(&self, required: Role) -> Result<&UserId, AuthError> {
        let id = self.require_user()?;
        if self.user.has_permission(required) {
            Ok(id)
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }

    /// Get cache key for this session.
    pub fn cache_key(&self) -> String {
        cache_key!("session", self.id)
    }
}

/// Session store configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session duration in seconds.
    pub duration_secs: i64,
    /// Whether to extend the session on activity.
    pub sliding_expiration: bool,
    /// Inactivity timeout in seconds (if sliding expiration enabled).
    pub inactivity_timeout_secs: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: AuthSession::DEFAULT_DURATION_SECS,
            sliding_expiration: true,
            inactivity_timeout_secs: 30 * 60,
        }
    }
}

/// Sessions persisted in the Key-Value store.
pub struct SessionStore {
    cache: Cache,
    config: SessionConfig,
}

impl SessionStore {
    /// Open a store over the default Key-Value store.
    pub fn open_default() -> Result<Self, AuthError> {
        Ok(Self {
            cache: Cache::open_default()?,
            config: SessionConfig::default(),
        })
    }

    /// Open with explicit configuration.
    pub fn with_config(config: SessionConfig) -> Result<Self, AuthError> {
        Ok(Self {
            cache: Cache::open_default()?,
            config,
        })
    }

    /// Load a live session, applying expiry and sliding renewal.
    ///
    /// Expired or idle sessions are deleted and reported as absent.
    pub fn load(&self, id: &SessionId) -> Result<Option<AuthSession>, AuthError> {
        let key = cache_key!("session", id);
        let Some(mut session) = self.cache.get::<AuthSession>(&key)? else {
            return Ok(None);
        };

        if session.is_expired()
            || (self.config.sliding_expiration
                && session.is_inactive(self.config.inactivity_timeout_secs))
        {
            self.cache.delete(&key)?;
            return Ok(None);
        }

        if self.config.sliding_expiration {
            session.extend(self.config.duration_secs);
            self.cache.set(&key, &session)?;
        }

        Ok(Some(session))
    }

    /// Persist a session.
    pub fn save(&self, session: &AuthSession) -> Result<(), AuthError> {
        self.cache.set(&session.cache_key(), session)?;
        Ok(())
    }

    /// Delete a session.
    pub fn delete(&self, id: &SessionId) -> Result<(), AuthError> {
        self.cache.delete(&cache_key!("session", id))?;
        Ok(())
    }
}

/// Generate a prefixed, URL-safe random token.
fn secure_token(prefix: &str) -> String {
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use rand::Rng;

    let bytes: [u8; 18] = rand::thread_rng().gen();
    format!("{}_{}", prefix, URL_SAFE_NO_PAD.encode(bytes))
}

fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
