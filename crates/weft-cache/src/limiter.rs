//! Fixed-window rate limiting backed by the Key-Value store.
//!
//! Components are instantiated per request, so counters cannot live in
//! process memory. Each (scope, client identifier) pair gets a window
//! record in the store; the allow/deny decision itself is a pure function
//! of the record and the clock, so it is testable without a store.

use crate::{cache_key, Cache, CacheError};
use serde::{Deserialize, Serialize};

/// A named rate-limit tier: at most `max_requests` per `window_secs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Key namespace, e.g. "payment".
    pub scope: &'static str,
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window length in seconds.
    pub window_secs: u64,
}

impl RateLimit {
    /// Login/register attempts: 5 per 15 minutes.
    pub const AUTH: RateLimit = RateLimit {
        scope: "auth",
        max_requests: 5,
        window_secs: 15 * 60,
    };

    /// Payment intent/verify calls: 10 per minute.
    pub const PAYMENT: RateLimit = RateLimit {
        scope: "payment",
        max_requests: 10,
        window_secs: 60,
    };

    /// General API traffic: 100 per minute.
    pub const API: RateLimit = RateLimit {
        scope: "api",
        max_requests: 100,
        window_secs: 60,
    };

    /// Cart mutations: 50 per minute.
    pub const CART: RateLimit = RateLimit {
        scope: "cart",
        max_requests: 50,
        window_secs: 60,
    };

    /// Contact submissions: 5 per hour.
    pub const CONTACT: RateLimit = RateLimit {
        scope: "contact",
        max_requests: 5,
        window_secs: 60 * 60,
    };

    /// Store key for a client identifier under this tier.
    pub fn key(&self, identifier: &str) -> String {
        cache_key!("rate", self.scope, identifier)
    }
}

/// Persisted window record for one (scope, identifier) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowState {
    /// Unix seconds when the current window opened. Zero means fresh.
    pub window_start: u64,
    /// Requests seen in the current window, including denied ones.
    pub count: u32,
}

impl WindowState {
    /// Apply one request at time `now` and return the successor state
    /// plus the decision. Denied requests still count, so a client that
    /// keeps hammering does not slide its own window forward.
    pub fn apply(&self, limit: &RateLimit, now: u64) -> (WindowState, RateDecision) {
        let expired = self.window_start == 0 || now >= self.window_start + limit.window_secs;

        let next = if expired {
            WindowState {
                window_start: now,
                count: 1,
            }
        } else {
            WindowState {
                window_start: self.window_start,
                count: self.count.saturating_add(1),
            }
        };

        let allowed = next.count <= limit.max_requests;
        let decision = RateDecision {
            allowed,
            remaining: limit.max_requests.saturating_sub(next.count),
            retry_after_secs: if allowed {
                0
            } else {
                (next.window_start + limit.window_secs).saturating_sub(now)
            },
        };

        (next, decision)
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests left in the current window.
    pub remaining: u32,
    /// Seconds until the window resets; zero when allowed.
    pub retry_after_secs: u64,
}

/// Rate limiter over the Key-Value store.
pub struct RateLimiter {
    cache: Cache,
}

impl RateLimiter {
    /// Open a limiter over the default store.
    pub fn open_default() -> Result<Self, CacheError> {
        Ok(Self {
            cache: Cache::open_default()?,
        })
    }

    /// Wrap an already-open cache.
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// Record one request for `identifier` under `limit` and decide.
    pub fn check(&self, limit: &RateLimit, identifier: &str) -> Result<RateDecision, CacheError> {
        let key = limit.key(identifier);
        let state: WindowState = self.cache.get(&key)?.unwrap_or_default();
        let (next, decision) = state.apply(limit, current_timestamp());
        self.cache.set(&key, &next)?;
        Ok(decision)
    }
}

fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_limit() {
        let limit = RateLimit::AUTH;
        let mut state = WindowState::default();
        let now = 1_700_000_000;

        for i in 0..limit.max_requests {
            let (next, decision) = state.apply(&limit, now);
            assert!(decision.allowed, "request {} should be allowed", i + 1);
            state = next;
        }

        let (_, decision) = state.apply(&limit, now);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
    }

    #[test]
    fn test_window_resets_after_expiry() {
        let limit = RateLimit::PAYMENT;
        let state = WindowState {
            window_start: 1_000,
            count: limit.max_requests,
        };

        let (next, decision) = state.apply(&limit, 1_000 + limit.window_secs);
        assert!(decision.allowed);
        assert_eq!(next.count, 1);
        assert_eq!(next.window_start, 1_000 + limit.window_secs);
    }

    #[test]
    fn test_retry_after_counts_down_to_reset() {
        let limit = RateLimit::AUTH; // 5 per 900s
        let state = WindowState {
            window_start: 1_000,
            count: 5,
        };

        let (_, decision) = state.apply(&limit, 1_500);
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_secs, 1_000 + 900 - 1_500);
    }

    #[test]
    fn test_denied_requests_still_count() {
        let limit = RateLimit::CONTACT; // 5 per hour
        let mut state = WindowState {
            window_start: 1_000,
            count: 5,
        };

        for _ in 0..3 {
            let (next, decision) = state.apply(&limit, 1_010);
            assert!(!decision.allowed);
            state = next;
        }
        assert_eq!(state.count, 8);
        // Window start never moved
        assert_eq!(state.window_start, 1_000);
    }

    #[test]
    fn test_remaining_decrements() {
        let limit = RateLimit::PAYMENT; // 10 per minute
        let state = WindowState::default();
        let (state, decision) = state.apply(&limit, 50);
        assert_eq!(decision.remaining, 9);
        let (_, decision) = state.apply(&limit, 51);
        assert_eq!(decision.remaining, 8);
    }

    #[test]
    fn test_keys_are_scoped() {
        assert_eq!(
            RateLimit::PAYMENT.key("1.2.3.4-mozilla"),
            "rate:payment:1.2.3.4-mozilla"
        );
        assert_ne!(
            RateLimit::AUTH.key("client"),
            RateLimit::CART.key("client")
        );
    }

    #[test]
    fn test_fresh_state_opens_window_at_now() {
        let limit = RateLimit::API;
        let (next, decision) = WindowState::default().apply(&limit, 42);
        assert!(decision.allowed);
        assert_eq!(next.window_start, 42);
        assert_eq!(next.count, 1);
    }
}
