//! Local fixed-window rate limit.

use std::num::NonZeroU64;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::backend::RateLimit;
use super::interval::parse_interval;
use crate::config::LocalConfig;
use crate::error::{ConfigError, RateLimitError};

/// Mutable part of the limiter, only ever touched under the lock.
#[derive(Debug)]
struct WindowState {
    /// Accesses left in the current window, `0..=capacity`
    remaining: u64,
    /// When the current window began
    window_start: Instant,
}

/// A simple X every Y rate limit.
///
/// Up to `capacity` accesses are granted per window. Once the quota is spent,
/// callers are told how long is left until the window expires; the first
/// access after expiry starts a new window and is itself granted. The counter
/// resets in one lump rather than refilling continuously.
///
/// Safe to share between any number of threads or tasks.
#[derive(Debug)]
pub struct WindowedLimiter {
    capacity: NonZeroU64,
    window: Duration,
    state: Mutex<WindowState>,
}

impl WindowedLimiter {
    /// Create a limiter granting `count` accesses every `interval`.
    ///
    /// `interval` is a duration spec such as `"1s"` or `"500ms"`.
    pub fn new(count: i64, interval: &str) -> Result<Self, ConfigError> {
        let capacity = u64::try_from(count)
            .ok()
            .and_then(NonZeroU64::new)
            .ok_or(ConfigError::InvalidCapacity { count })?;
        let window = parse_interval(interval)?;

        Self::with_window(capacity, window)
    }

    /// Create a limiter from its configuration section.
    pub fn from_config(config: &LocalConfig) -> Result<Self, ConfigError> {
        Self::new(config.count, &config.interval)
    }

    /// Create a limiter from already typed values.
    pub fn with_window(capacity: NonZeroU64, window: Duration) -> Result<Self, ConfigError> {
        if window.is_zero() {
            return Err(ConfigError::InvalidInterval {
                interval: format!("{:?}", window),
                reason: "interval must be larger than zero".to_string(),
            });
        }

        debug!(
            capacity = capacity.get(),
            window = ?window,
            "Creating local rate limit"
        );

        Ok(Self {
            capacity,
            window,
            state: Mutex::new(WindowState {
                remaining: capacity.get(),
                window_start: Instant::now(),
            }),
        })
    }

    /// Access the rate limited resource.
    ///
    /// Returns `Duration::ZERO` if the access is granted, otherwise the time
    /// left until the current window expires. Never blocks beyond the lock.
    pub fn access(&self) -> Duration {
        let mut state = self.state.lock();

        if let Some(remaining) = state.remaining.checked_sub(1) {
            state.remaining = remaining;
            return Duration::ZERO;
        }

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(state.window_start);

        if elapsed < self.window {
            let wait = self.window - elapsed;
            trace!(wait = ?wait, "Rate limit exhausted for current window");
            return wait;
        }

        // This access is the first of the new window.
        state.remaining = self.capacity.get() - 1;
        state.window_start = now;
        debug!(
            elapsed = ?elapsed,
            remaining = state.remaining,
            "Rate limit window reset"
        );

        Duration::ZERO
    }

    /// Maximum accesses granted per window.
    pub fn capacity(&self) -> u64 {
        self.capacity.get()
    }

    /// Length of each window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Accesses left in the current window as last recorded.
    ///
    /// An expired window is only reset by the next access, so this can read
    /// zero even though the next call will be granted.
    pub fn remaining(&self) -> u64 {
        self.state.lock().remaining
    }

    /// Shut down the rate limit. There is nothing to stop.
    pub fn close_async(&self) {
        debug!("Closing local rate limit");
    }

    /// Wait for the rate limit to close. Returns immediately.
    pub fn wait_for_close(&self, _timeout: Duration) -> Result<(), RateLimitError> {
        Ok(())
    }
}

#[async_trait]
impl RateLimit for WindowedLimiter {
    async fn access(&self) -> Result<Duration, RateLimitError> {
        Ok(WindowedLimiter::access(self))
    }

    fn close_async(&self) {
        WindowedLimiter::close_async(self)
    }

    async fn wait_for_close(&self, timeout: Duration) -> Result<(), RateLimitError> {
        WindowedLimiter::wait_for_close(self, timeout)
    }
}
