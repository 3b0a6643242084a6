//! Parsing of interval strings such as `"1s"`, `"500ms"` or `"1h30m"`.

use std::time::Duration;

use crate::error::ConfigError;

/// Parse a duration spec into a strictly positive [`Duration`].
///
/// Negative, zero and malformed specs are all rejected with
/// [`ConfigError::InvalidInterval`].
pub fn parse_interval(spec: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidInterval {
        interval: spec.to_string(),
        reason,
    };

    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(invalid("interval is empty".to_string()));
    }

    let period = humantime::parse_duration(trimmed).map_err(|e| invalid(e.to_string()))?;
    if period.is_zero() {
        return Err(invalid("interval must be larger than zero".to_string()));
    }

    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_common_intervals() {
        assert_eq!(parse_interval("1s").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_interval("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_interval("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_interval(" 2m ").unwrap(), Duration::from_secs(120));
    }

    #[test]
    fn test_reject_malformed_interval() {
        let err = parse_interval("notaduration").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInterval { ref interval, .. } if interval == "notaduration"));
    }

    #[test]
    fn test_reject_negative_interval() {
        assert!(matches!(
            parse_interval("-1s"),
            Err(ConfigError::InvalidInterval { .. })
        ));
    }

    #[test]
    fn test_reject_zero_and_empty_interval() {
        assert!(matches!(
            parse_interval("0s"),
            Err(ConfigError::InvalidInterval { .. })
        ));
        assert!(matches!(
            parse_interval(""),
            Err(ConfigError::InvalidInterval { .. })
        ));
    }
}
