use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    HttpResponse,
};
use futures::future::LocalBoxFuture;
use serde_json::json;
use std::{
    collections::HashMap,
    future::{ready, Ready},
    net::IpAddr,
    sync::{Arc, Mutex},
    task::{Context, Poll},
    time::{Duration, Instant},
};
use tracing::warn;

use crate::configuration::RateLimitSettings;

/// Number of tracked clients above which expired windows are purged
const PURGE_THRESHOLD: usize = 10_000;

struct Window {
    started_at: Instant,
    count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Fixed-window request counter, per client IP
///
/// A client gets `max_requests` requests per window. The window of a client starts
/// with its first request and is reset once `window` has elapsed.
pub struct FixedWindowRateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl FixedWindowRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.max_requests, Duration::from_secs(settings.window_s))
    }

    pub fn check(&self, client: IpAddr) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    /// Counts a request of `client` made at `now`
    pub fn check_at(&self, client: IpAddr, now: Instant) -> RateLimitDecision {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if windows.len() > PURGE_THRESHOLD {
            let window = self.window;
            windows.retain(|_, w| now.saturating_duration_since(w.started_at) < window);
        }

        let window = windows.entry(client).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.saturating_duration_since(window.started_at) >= self.window {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let elapsed = now.saturating_duration_since(window.started_at);
            return RateLimitDecision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        RateLimitDecision::Allowed {
            remaining: self.max_requests - window.count,
        }
    }
}

/// Middleware factory for the rate limiting, sharing one limiter among all the workers
pub struct RateLimit {
    limiter: Arc<FixedWindowRateLimiter>,
}

impl RateLimit {
    pub fn new(limiter: Arc<FixedWindowRateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Transform = RateLimitMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.limiter.clone(),
        }))
    }
}

/// Answers with a 429 once a client exceeded its requests for the current window
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: Arc<FixedWindowRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let client = match req.peer_addr() {
            Some(address) => address.ip(),
            // No peer address (ie. unix socket): nothing to rate limit on
            None => {
                let fut = self.service.call(req);
                return Box::pin(async move { Ok(fut.await?.map_into_left_body()) });
            }
        };

        if let RateLimitDecision::Limited { retry_after } = self.limiter.check(client) {
            warn!(%client, ?retry_after, "Rate limit exceeded");

            // Rounded up so a client waiting `Retry-After` seconds lands in a new window
            let retry_after_s = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            let response = HttpResponse::TooManyRequests()
                .insert_header((header::RETRY_AFTER, retry_after_s.to_string()))
                .json(json!({ "error": "Too many requests, please try again later." }));

            return Box::pin(ready(Ok(req.into_response(response).map_into_right_body())));
        }

        let fut = self.service.call(req);
        Box::pin(async move { Ok(fut.await?.map_into_left_body()) })
    }
}
