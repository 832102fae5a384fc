//! # Middleware Module
//!
//! Rate limiting for the Vitrina HTTP API.
//!
//! ## Configuration
//!
//! - `VITRINA_RATE_LIMIT`: Requests per second (default: 100, 0 disables)

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Default rate limit in requests per second.
const DEFAULT_RPS: u32 = 100;

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a new global rate limiter. Zero falls back to the default.
pub fn create_rate_limiter(requests_per_second: u32) -> GlobalRateLimiter {
    let rps = NonZeroU32::new(requests_per_second)
        .or(NonZeroU32::new(DEFAULT_RPS))
        .unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_second(rps)))
}

/// Read `VITRINA_RATE_LIMIT`, or 100 if unset or unparsable.
pub fn get_rate_limit_from_env() -> u32 {
    parse_rate_limit(std::env::var("VITRINA_RATE_LIMIT").ok().as_deref())
}

fn parse_rate_limit(value: Option<&str>) -> u32 {
    value
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RPS)
}

/// Rejects requests with 429 once the global limit is exceeded.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!("Rate limit exceeded");
            Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
