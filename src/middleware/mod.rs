//! Middleware components
//!
//! This module contains middleware for:
//! - Rate limiting
//! - Security and cache-control headers

pub mod rate_limit;
pub mod security_headers;

pub use rate_limit::{rate_limit_middleware, spawn_rate_limit_cleanup, RateLimitState};
pub use security_headers::{api_cache_control_middleware, security_headers_middleware};
