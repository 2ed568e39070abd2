//! Fixed-window rate limiting
//!
//! Keys are namespaced `action:identifier`, e.g. `login:203.0.113.7`.

mod limiter;
mod memory;

pub use limiter::{rate_limit_key, RateLimitStatus, RateLimiterTrait};
pub use memory::InMemoryRateLimiter;
