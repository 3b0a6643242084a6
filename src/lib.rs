//! Sharedlimit - Shared Fixed-Window Rate Limiting
//!
//! This crate implements a rate limit that is built once and shared by any
//! number of concurrent workers hitting the same protected resource, so that
//! their combined access rate never exceeds a configured count per interval.
//! Callers ask before each access and are told either to go ahead or how long
//! to wait; the limiter itself never sleeps.

pub mod config;
pub mod error;
pub mod ratelimit;

pub use error::{ConfigError, RateLimitError, SharedLimitError};
pub use ratelimit::{RateLimit, Registry, WindowedLimiter};
