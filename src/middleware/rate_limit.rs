// Sliding-window rate limiting keyed per client.
//
// The client key is the bearer token when one is presented, else the
// client IP. State is a sharded concurrent map of per-key timestamp
// windows; the accessed key is pruned on each call, and a periodic
// sweep drops keys that have sat idle for a full window, so the map
// is bounded by the set of recently active clients.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use dashmap::DashMap;
use tracing::warn;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::track_rate_limit_hit;
use crate::utils::extract_ip_address;

#[derive(Debug, PartialEq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_seconds: u64 },
}

/// Calls between full-map sweeps of idle client entries.
const SWEEP_INTERVAL: u64 = 1024;

#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Vec<i64>>>,
    calls: Arc<AtomicU64>,
    max_requests: usize,
    window_ms: i64,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            calls: Arc::new(AtomicU64::new(0)),
            max_requests: max_requests as usize,
            window_ms: window.as_millis() as i64,
        }
    }

    /// Admits or rejects one request for `client_key`, recording it when
    /// admitted. Rejections carry the seconds until the oldest recorded
    /// request leaves the window.
    pub fn try_acquire(&self, client_key: &str) -> RateDecision {
        self.try_acquire_at(client_key, Utc::now().timestamp_millis())
    }

    fn try_acquire_at(&self, client_key: &str, now_ms: i64) -> RateDecision {
        if self.calls.fetch_add(1, Ordering::Relaxed) % SWEEP_INTERVAL == 0 {
            self.sweep(now_ms);
        }

        let mut window = self.windows.entry(client_key.to_string()).or_default();
        window.retain(|&stamp| now_ms - stamp < self.window_ms);

        if window.len() >= self.max_requests {
            let oldest = window.first().copied().unwrap_or(now_ms);
            let remaining_ms = (oldest + self.window_ms - now_ms).max(0);
            return RateDecision::Limited {
                retry_after_seconds: (remaining_ms as u64).div_ceil(1000).max(1),
            };
        }

        window.push(now_ms);
        RateDecision::Allowed
    }

    /// Drops every key whose entire window has expired. Keeps the map
    /// bounded even when client keys are high-cardinality (per-token,
    /// per-spoofed-IP).
    fn sweep(&self, now_ms: i64) {
        self.windows.retain(|_, window| {
            window.retain(|&stamp| now_ms - stamp < self.window_ms);
            !window.is_empty()
        });
    }

    /// Number of client keys currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client_key = client_key(request.headers());

    match state.rate_limiter.try_acquire(&client_key) {
        RateDecision::Allowed => Ok(next.run(request).await),
        RateDecision::Limited {
            retry_after_seconds,
        } => {
            warn!(
                client_key = %client_key,
                retry_after_seconds,
                "Rate limit exceeded"
            );
            track_rate_limit_hit();
            Err(ApiError::RateLimitExceeded {
                retry_after_seconds,
            })
        }
    }
}

/// Bearer token when present, client IP otherwise. Prefixes keep the
/// two namespaces from colliding.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|token| format!("token:{}", token))
        .unwrap_or_else(|| format!("ip:{}", extract_ip_address(headers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_admits_up_to_limit_then_rejects() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let now = 1_000_000;

        for _ in 0..3 {
            assert_eq!(limiter.try_acquire_at("client", now), RateDecision::Allowed);
        }
        assert!(matches!(
            limiter.try_acquire_at("client", now),
            RateDecision::Limited { .. }
        ));
    }

    #[test]
    fn test_window_slides() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = 1_000_000;

        assert_eq!(limiter.try_acquire_at("client", start), RateDecision::Allowed);
        assert_eq!(limiter.try_acquire_at("client", start), RateDecision::Allowed);
        assert!(matches!(
            limiter.try_acquire_at("client", start + 1_000),
            RateDecision::Limited { .. }
        ));

        // Both stamps have left the window 61 s later.
        assert_eq!(
            limiter.try_acquire_at("client", start + 61_000),
            RateDecision::Allowed
        );
    }

    #[test]
    fn test_retry_after_counts_down_to_oldest_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = 1_000_000;

        assert_eq!(limiter.try_acquire_at("client", start), RateDecision::Allowed);
        match limiter.try_acquire_at("client", start + 45_000) {
            RateDecision::Limited {
                retry_after_seconds,
            } => assert_eq!(retry_after_seconds, 15),
            RateDecision::Allowed => panic!("expected rejection"),
        }
    }

    #[test]
    fn test_clients_are_isolated() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = 1_000_000;

        assert_eq!(limiter.try_acquire_at("a", now), RateDecision::Allowed);
        assert!(matches!(
            limiter.try_acquire_at("a", now),
            RateDecision::Limited { .. }
        ));
        assert_eq!(limiter.try_acquire_at("b", now), RateDecision::Allowed);
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_idle_clients_are_swept() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = 1_000_000;

        assert_eq!(limiter.try_acquire_at("idle-a", start), RateDecision::Allowed);
        assert_eq!(limiter.try_acquire_at("idle-b", start), RateDecision::Allowed);
        assert_eq!(limiter.tracked_clients(), 2);

        // One window later the idle keys must be dropped once the
        // periodic sweep fires; only the active key survives.
        let later = start + 61_000;
        for _ in 0..=SWEEP_INTERVAL {
            limiter.try_acquire_at("active", later);
        }
        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn test_client_key_prefers_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc123"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(client_key(&headers), "token:abc123");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(client_key(&headers), "ip:10.0.0.1");

        assert_eq!(client_key(&HeaderMap::new()), "ip:127.0.0.1");
    }
}
