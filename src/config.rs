//! Configuration management for sharedlimit.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{Result, SharedLimitError};

/// Configuration for a single named rate limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Which registered backend to build
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,

    /// Settings for the local backend
    #[serde(default)]
    pub local: LocalConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            local: LocalConfig::default(),
        }
    }
}

fn default_kind() -> String {
    "local".to_string()
}

/// Fields for a local rate limit.
///
/// Values are checked when the limiter is constructed, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Accesses permitted per interval
    #[serde(default = "default_count")]
    pub count: i64,

    /// Interval length, e.g. "1s" or "500ms"
    #[serde(default = "default_interval")]
    pub interval: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            interval: default_interval(),
        }
    }
}

fn default_count() -> i64 {
    1000
}

fn default_interval() -> String {
    "1s".to_string()
}

/// Configuration for the `sharedlimit` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// The rate limit shared by every worker
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Number of concurrent workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// How long to run before shutting down, e.g. "10s"
    #[serde(default = "default_run_for")]
    pub run_for: String,

    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rate_limit: RateLimitConfig::default(),
            workers: default_workers(),
            run_for: default_run_for(),
            log_level: default_log_level(),
        }
    }
}

fn default_workers() -> usize {
    4
}

fn default_run_for() -> String {
    "10s".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a file path.
    ///
    /// Files ending in `.json` are read as JSON, anything else as YAML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration");

        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| SharedLimitError::Config(format!("Failed to parse YAML config: {}", e)))
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SharedLimitError::Config(format!("Failed to parse JSON config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.rate_limit.kind, "local");
        assert_eq!(config.rate_limit.local.count, 1000);
        assert_eq!(config.rate_limit.local.interval, "1s");
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_parse_yaml_config() {
        let yaml = r#"
rate_limit:
  type: local
  local:
    count: 50
    interval: 500ms
workers: 8
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rate_limit.local.count, 50);
        assert_eq!(config.rate_limit.local.interval, "500ms");
        assert_eq!(config.workers, 8);
        assert_eq!(config.run_for, "10s");
    }

    #[test]
    fn test_parse_json_config() {
        let json = r#"{"rate_limit": {"type": "local", "local": {"count": 3}}}"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.rate_limit.local.count, 3);
        assert_eq!(config.rate_limit.local.interval, "1s");
    }

    #[test]
    fn test_negative_count_is_left_for_construction() {
        let yaml = "rate_limit:\n  local:\n    count: -5\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.rate_limit.local.count, -5);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let result = AppConfig::from_yaml("workers: [not, a, number]");
        assert!(matches!(result, Err(SharedLimitError::Config(_))));
    }

    #[test]
    fn test_from_file_picks_format_by_extension() {
        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(json, r#"{{"workers": 2}}"#).unwrap();
        assert_eq!(AppConfig::from_file(json.path()).unwrap().workers, 2);

        let mut yaml = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(yaml, "workers: 3").unwrap();
        assert_eq!(AppConfig::from_file(yaml.path()).unwrap().workers, 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = AppConfig::from_file("/nonexistent/sharedlimit.yaml");
        assert!(matches!(result, Err(SharedLimitError::Io(_))));
    }
}
