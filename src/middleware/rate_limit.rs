//! Rate limiting middleware
//!
//! Per-IP request limits for the API. Summaries, answers and challenge rounds
//! all call the language model, so clients are throttled before a request
//! reaches a handler. Uses the governor crate with one direct limiter per IP.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{
    collections::HashMap,
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::RateLimitSettings;
use crate::utils::error::ErrorResponse;

/// Upper bound on the number of client IPs tracked at once
const MAX_TRACKED_IPS: usize = 10_000;

/// Limiter for a single client IP
pub type IpRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>;

/// Shared map of client IPs to their limiters
#[derive(Clone)]
pub struct RateLimitState {
    limiters: Arc<RwLock<HashMap<IpAddr, Arc<IpRateLimiter>>>>,
    quota: Quota,
}

impl RateLimitState {
    pub fn new(settings: &RateLimitSettings) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(settings.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(settings.burst_size).unwrap_or(NonZeroU32::MIN));

        Self {
            limiters: Arc::new(RwLock::new(HashMap::new())),
            quota,
        }
    }

    async fn limiter_for(&self, ip: IpAddr) -> Arc<IpRateLimiter> {
        {
            let limiters = self.limiters.read().await;
            if let Some(limiter) = limiters.get(&ip) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().await;
        limiters
            .entry(ip)
            .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
            .clone()
    }

    /// Whether a request from `ip` is within its quota
    pub async fn check(&self, ip: IpAddr) -> bool {
        self.limiter_for(ip).await.check().is_ok()
    }

    pub async fn tracked_ips(&self) -> usize {
        self.limiters.read().await.len()
    }

    /// Forget half of the tracked IPs once the map grows past its bound
    pub async fn cleanup(&self) {
        let mut limiters = self.limiters.write().await;
        let initial = limiters.len();

        if initial > MAX_TRACKED_IPS {
            let to_remove: Vec<IpAddr> = limiters.keys().take(initial / 2).copied().collect();
            for ip in to_remove {
                limiters.remove(&ip);
            }
            debug!(
                "Rate limiter cleanup: {} -> {} entries",
                initial,
                limiters.len()
            );
        }
    }
}

/// Reject requests from clients that exceeded their quota with 429
pub async fn rate_limit_middleware(
    State(rate_limit): State<RateLimitState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = addr.ip();

    if rate_limit.check(ip).await {
        next.run(request).await
    } else {
        warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
        RateLimitExceeded.into_response()
    }
}

/// Too many requests
pub struct RateLimitExceeded;

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [("Retry-After", "1")],
            Json(ErrorResponse::new(
                "rate_limited",
                "Too many requests. Please try again later.",
            )),
        )
            .into_response()
    }
}

/// Periodically bound the number of tracked IPs
pub fn spawn_rate_limit_cleanup(state: RateLimitState) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            state.cleanup().await;
        }
    });
}
