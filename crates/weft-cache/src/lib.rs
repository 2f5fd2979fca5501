//! Key-Value caching layer for the Weft storefront.
//!
//! Wraps Spin's Key-Value store with automatic JSON serialization. Holds
//! the short-lived state that does not belong in SQLite: auth sessions,
//! the courier bearer token, and rate-limit windows.
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_cache::{Cache, cache_key};
//!
//! let cache = Cache::open_default()?;
//! let key = cache_key!("courier", "token");
//! cache.set(&key, &token)?;
//! let token: Option<CourierToken> = cache.get(&key)?;
//! ```

mod error;
mod kv;
mod limiter;

pub use error::CacheError;
pub use kv::Cache;
pub use limiter::{RateDecision, RateLimit, RateLimiter, WindowState};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{Cache, CacheError, RateDecision, RateLimit, RateLimiter};
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("rate", "payment", client_id);
/// // Returns "rate:payment:<client_id>"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}
