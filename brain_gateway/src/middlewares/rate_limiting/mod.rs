mod middleware;

pub use middleware::{FixedWindowRateLimiter, RateLimit, RateLimitDecision, RateLimitMiddleware};
