//! Error types for sharedlimit.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while building a rate limiter from its configuration.
///
/// A bad count and a bad interval are distinct misconfigurations and are
/// reported separately.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The configured count was zero or negative.
    #[error("count must be larger than zero, got {count}")]
    InvalidCapacity { count: i64 },

    /// The configured interval could not be parsed into a positive duration.
    #[error("failed to parse interval {interval:?}: {reason}")]
    InvalidInterval { interval: String, reason: String },

    /// No constructor is registered under the requested kind.
    #[error("rate limit type {0:?} is not registered")]
    UnknownKind(String),
}

/// Errors a rate limiter backend may report at runtime.
///
/// The local backend never produces these; they exist so callers can treat
/// every backend the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// Shutdown did not complete within the given timeout.
    #[error("timed out after {0:?} waiting for rate limit to close")]
    Timeout(Duration),

    /// The backend could not reach whatever holds its shared state.
    #[error("rate limit backend unavailable: {0}")]
    Unavailable(String),
}

/// Main error type for sharedlimit operations.
#[derive(Error, Debug)]
pub enum SharedLimitError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limiter construction errors
    #[error("Rate limit construction failed: {0}")]
    Construction(#[from] ConfigError),

    /// Rate limiter runtime errors
    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sharedlimit operations.
pub type Result<T> = std::result::Result<T, SharedLimitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_and_interval_messages_differ() {
        let capacity = ConfigError::InvalidCapacity { count: 0 }.to_string();
        let interval = ConfigError::InvalidInterval {
            interval: "nope".to_string(),
            reason: "unknown unit".to_string(),
        }
        .to_string();

        assert!(capacity.contains("count"));
        assert!(interval.contains("interval"));
        assert!(interval.contains("nope"));
        assert_ne!(capacity, interval);
    }

    #[test]
    fn test_config_error_converts_into_crate_error() {
        let err: SharedLimitError = ConfigError::UnknownKind("redis".to_string()).into();
        assert!(matches!(err, SharedLimitError::Construction(ConfigError::UnknownKind(_))));
        assert!(err.to_string().contains("redis"));
    }
}
