//! Authentication for the Weft storefront.
//!
//! Users and their credentials live in SQLite; sessions live in the
//! Key-Value store and scope both authenticated users and anonymous
//! shoppers (whose session token owns their cart).

mod error;
mod password;
mod session;
mod store;
mod user;

pub use error::AuthError;
pub use password::{hash_password, validate_password, verify_password};
pub use session::{AuthSession, SessionConfig, SessionId, SessionStore};
pub use store::UserStore;
pub use user::{Role, User, UserRecord};
