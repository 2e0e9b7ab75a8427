//! Rate limiting for report generation — bounds spend on the paid model call.
//!
//! Fixed-window counters keyed by a namespaced client key (`report:<ip>`).
//! `AppState` holds an `Arc<dyn RateLimiter>`; Redis is used when `REDIS_URL`
//! is configured so limits hold across instances, memory otherwise.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use memory::MemoryRateLimiter;
pub use self::redis::RedisRateLimiter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
}

#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Counts one request against `key` and reports whether it may proceed.
    /// Must be atomic per key under concurrent calls.
    async fn check(&self, key: &str) -> Result<RateDecision, RateLimitError>;
}

/// Best-effort client address: first `X-Forwarded-For` hop, then `X-Real-IP`,
/// then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse().ok());
    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    };
    forwarded.or_else(real_ip).or(peer.map(|p| p.ip()))
}

pub fn report_key(ip: Option<IpAddr>) -> String {
    match ip {
        Some(ip) => format!("report:{ip}"),
        None => "report:unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_default_policy_is_five_per_hour() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.max_requests, 5);
        assert_eq!(policy.window, Duration::from_secs(3600));
    }

    #[test]
    fn test_client_ip_prefers_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        let peer: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(
            client_ip(&headers, Some(peer)),
            Some("203.0.113.7".parse().unwrap())
        );
    }

    #[test]
    fn test_client_ip_falls_back_to_real_ip_then_peer() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("garbage"));
        headers.insert("x-real-ip", HeaderValue::from_static("198.51.100.2"));
        assert_eq!(
            client_ip(&headers, None),
            Some("198.51.100.2".parse().unwrap())
        );

        let peer: SocketAddr = "192.0.2.9:443".parse().unwrap();
        assert_eq!(
            client_ip(&HeaderMap::new(), Some(peer)),
            Some(peer.ip())
        );
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_report_key_is_namespaced() {
        assert_eq!(
            report_key(Some("10.1.2.3".parse().unwrap())),
            "report:10.1.2.3"
        );
        assert_eq!(report_key(None), "report:unknown");
    }
}
