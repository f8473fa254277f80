//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Provides configurable rate limiters for different endpoint categories:
//! - `auth_rate_limiter`: Strict limits for auth endpoints (~10/min), which
//!   issue OTP codes and emails and are the obvious brute-force target
//! - `api_rate_limiter`: Relaxed limits for catalog and cart endpoints
//!
//! Limits can be overridden per deployment:
//! - `API_AUTH_RATE_SECONDS` / `API_AUTH_RATE_BURST` (defaults: 6 / 5)
//! - `API_RATE_SECONDS` / `API_RATE_BURST` (defaults: 1 / 50)
//!
//! Integration test runs raise the burst values so parallel tests don't trip
//! the limiter.

use std::sync::Arc;

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

/// Rate limiter layer type for Axum.
///
/// Uses `SmartIpKeyExtractor` to resolve the real client IP from standard
/// proxy headers before falling back to the peer address.
pub type RateLimiterLayer =
    GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Read a positive integer override from the environment.
fn env_override(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn limiter(seconds: u64, burst: u32) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(seconds)
        .burst_size(burst)
        .finish()
        .expect("rate limiter config with positive per_second and burst_size is valid");
    GovernorLayer::new(Arc::new(config))
}

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// Default configuration: 1 request every 6 seconds (replenish), burst of 5.
/// This bounds OTP guessing and registration abuse.
#[must_use]
pub fn auth_rate_limiter() -> RateLimiterLayer {
    let seconds = env_override("API_AUTH_RATE_SECONDS", 6);
    #[allow(clippy::cast_possible_truncation)] // burst sizes are small
    let burst = env_override("API_AUTH_RATE_BURST", 5) as u32;
    limiter(seconds, burst)
}

/// Create rate limiter for general API: ~100 requests per minute per IP.
///
/// Default configuration: 1 request per second (replenish), burst of 50.
#[must_use]
pub fn api_rate_limiter() -> RateLimiterLayer {
    let seconds = env_override("API_RATE_SECONDS", 1);
    #[allow(clippy::cast_possible_truncation)] // burst sizes are small
    let burst = env_override("API_RATE_BURST", 50) as u32;
    limiter(seconds, burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_override_default_when_unset() {
        assert_eq!(env_override("POMELO_TEST_RATE_UNSET", 6), 6);
    }
}
