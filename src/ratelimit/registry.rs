//! Table of named rate limit constructors.
//!
//! The registry is an ordinary value owned by whoever assembles the pipeline
//! and passed to the code that builds limiters. Nothing is registered
//! globally.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::backend::RateLimit;
use super::local::WindowedLimiter;
use crate::config::RateLimitConfig;
use crate::error::ConfigError;

/// Kind name of the local fixed-window backend.
pub const TYPE_LOCAL: &str = "local";

/// Builds a rate limit from its configuration.
pub type Constructor = fn(&RateLimitConfig) -> Result<Arc<dyn RateLimit>, ConfigError>;

/// A registered backend.
#[derive(Clone)]
struct Registration {
    constructor: Constructor,
    description: String,
}

/// Maps a configured kind to the constructor for that backend.
#[derive(Clone, Default)]
pub struct Registry {
    entries: HashMap<String, Registration>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the backends shipped with this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            TYPE_LOCAL,
            "The local rate limit is a simple X every Y type rate limit that can be \
             shared across any number of components within the pipeline.",
            new_local,
        );
        registry
    }

    /// Register a constructor, replacing any previous one for `kind`.
    pub fn register(&mut self, kind: &str, description: &str, constructor: Constructor) {
        debug!(kind = %kind, "Registering rate limit type");
        self.entries.insert(
            kind.to_string(),
            Registration {
                constructor,
                description: description.trim().to_string(),
            },
        );
    }

    /// Build the rate limit named by `config.kind`.
    pub fn build(&self, config: &RateLimitConfig) -> Result<Arc<dyn RateLimit>, ConfigError> {
        let registration = self
            .entries
            .get(&config.kind)
            .ok_or_else(|| ConfigError::UnknownKind(config.kind.clone()))?;
        (registration.constructor)(config)
    }

    /// Registered kinds in sorted order.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Description of a registered kind.
    pub fn description(&self, kind: &str) -> Option<&str> {
        self.entries.get(kind).map(|r| r.description.as_str())
    }
}

fn new_local(config: &RateLimitConfig) -> Result<Arc<dyn RateLimit>, ConfigError> {
    Ok(Arc::new(WindowedLimiter::from_config(&config.local)?))
}
