//! Rate limit trait shared by every backend.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RateLimitError;

/// Trait for rate limit implementations.
///
/// A single instance is shared (usually behind an `Arc`) by every worker that
/// touches the protected resource. Backends that keep their state elsewhere
/// can fail at runtime or take time to shut down, so both `access` and
/// `wait_for_close` return a `Result` even when a given backend never errors.
#[async_trait]
pub trait RateLimit: Send + Sync {
    /// Access the rate limited resource.
    ///
    /// Returns `Duration::ZERO` when the caller may proceed, otherwise a
    /// reasonable length of time to wait before asking again. Implementations
    /// never sleep on the caller's behalf.
    async fn access(&self) -> Result<Duration, RateLimitError>;

    /// Signal that the rate limit should shut down. Does not block.
    fn close_async(&self);

    /// Block until the rate limit has closed down or `timeout` elapses.
    async fn wait_for_close(&self, timeout: Duration) -> Result<(), RateLimitError>;
}
