//! # Per-Client Rate Limiting
//!
//! A fixed window per client. Signed-in callers are counted per session;
//! sign-up, sign-in and the OpenAPI document share one anonymous window.
//! Requests the auth layer turns away are charged to the anonymous window
//! too. A refused request gets 429 with `Retry-After` set to the seconds
//! left in the window.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::auth::CallerIdentity;
use crate::error::AppError;

/// Windows idle for a full period are swept once this many are tracked.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub max_requests: u64,
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn per_minute(max_requests: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::per_minute(600)
    }
}

/// Who a request is counted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKey {
    Session(Uuid),
    Anonymous,
}

impl ClientKey {
    fn of(request: &Request) -> Self {
        request
            .extensions()
            .get::<CallerIdentity>()
            .map_or(Self::Anonymous, |caller| Self::Session(caller.session_id))
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Session(id) => write!(f, "session:{id}"),
            Self::Anonymous => f.write_str("anonymous"),
        }
    }
}

#[derive(Debug)]
struct Window {
    opened: Instant,
    used: u64,
}

/// Shared limiter, installed as a request extension.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: Arc<Mutex<HashMap<ClientKey, Window>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Count one request against `key`. On refusal, returns how long until
    /// the window reopens.
    pub fn admit(&self, key: ClientKey) -> Result<(), Duration> {
        self.admit_at(key, Instant::now())
    }

    fn admit_at(&self, key: ClientKey, now: Instant) -> Result<(), Duration> {
        let period = self.config.window;
        let mut windows = self.windows.lock();
        if windows.len() > SWEEP_THRESHOLD {
            windows.retain(|_, w| now.duration_since(w.opened) < period);
        }

        let window = windows.entry(key).or_insert(Window {
            opened: now,
            used: 0,
        });
        let elapsed = now.duration_since(window.opened);
        if elapsed >= period {
            window.opened = now;
            window.used = 0;
        }
        if window.used >= self.config.max_requests {
            return Err(period.saturating_sub(now.duration_since(window.opened)));
        }
        window.used += 1;
        Ok(())
    }
}

/// Count `request` against `key` with the installed [`RateLimiter`].
/// Returns the 429 response when the window is used up.
pub fn charge(request: &Request, key: ClientKey) -> Option<Response> {
    let limiter = request.extensions().get::<RateLimiter>()?;
    let wait = limiter.admit(key).err()?;
    tracing::warn!(client = %key, retry_after_ms = wait.as_millis() as u64, "rate limit exceeded");
    Some(
        AppError::RateLimited {
            retry_after_secs: wait.as_secs().max(1),
        }
        .into_response(),
    )
}

/// Refuse requests over the caller's budget.
///
/// Layered inside the auth middleware on protected routes, so the session
/// id is already in the request extensions there.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let key = ClientKey::of(&request);
    match charge(&request, key) {
        Some(refused) => refused,
        None => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests: max,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn sessions_have_separate_windows() {
        let limiter = limiter(2);
        let (a, b) = (ClientKey::Session(Uuid::new_v4()), ClientKey::Session(Uuid::new_v4()));
        let t0 = Instant::now();
        assert!(limiter.admit_at(a, t0).is_ok());
        assert!(limiter.admit_at(a, t0).is_ok());
        assert!(limiter.admit_at(a, t0).is_err());
        assert!(limiter.admit_at(b, t0).is_ok());
        assert!(limiter.admit_at(ClientKey::Anonymous, t0).is_ok());
    }

    #[test]
    fn refusal_reports_time_left_and_window_reopens() {
        let limiter = limiter(1);
        let t0 = Instant::now();
        limiter.admit_at(ClientKey::Anonymous, t0).unwrap();
        let wait = limiter
            .admit_at(ClientKey::Anonymous, t0 + Duration::from_secs(45))
            .unwrap_err();
        assert_eq!(wait, Duration::from_secs(15));
        assert!(limiter
            .admit_at(ClientKey::Anonymous, t0 + Duration::from_secs(60))
            .is_ok());
    }

    #[test]
    fn charge_uses_installed_limiter() {
        let mut request = Request::new(axum::body::Body::empty());
        assert!(charge(&request, ClientKey::Anonymous).is_none());

        request.extensions_mut().insert(limiter(1));
        assert!(charge(&request, ClientKey::Anonymous).is_none());
        let refused = charge(&request, ClientKey::Anonymous).unwrap();
        assert_eq!(refused.status(), axum::http::StatusCode::TOO_MANY_REQUESTS);
        assert!(refused.headers().contains_key(axum::http::header::RETRY_AFTER));
    }

    #[test]
    fn key_display() {
        assert_eq!(ClientKey::Anonymous.to_string(), "anonymous");
        let id = Uuid::nil();
        assert_eq!(
            ClientKey::Session(id).to_string(),
            format!("session:{id}")
        );
    }
}
