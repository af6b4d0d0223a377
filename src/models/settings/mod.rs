// Settings module
// Countdown configuration snapshot and the validation rules for committed values

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const KEY_FETCH_URL: &str = "fetchURLString";
pub const KEY_FETCH_SECONDS: &str = "fetchSeconds";
pub const KEY_ENABLE_NOTIFICATION: &str = "enableNotification";
pub const KEY_LAUNCH_AT_LOGIN: &str = "launchAtLogin";

pub const DEFAULT_FETCH_URL: &str = "https://diamondgotcat.net/appledate.txt";
pub const DEFAULT_FETCH_SECONDS: &str = "60";

/// Shortest fetch period that is actually armed. Positive values below this
/// are raised to it.
pub const MIN_FETCH_INTERVAL: Duration = Duration::from_secs(1);

/// A setting value that cannot be committed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("invalid fetch URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },
    #[error("fetch URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("fetch interval must be greater than 0 seconds, got '{0}'")]
    NonPositiveInterval(String),
    #[error("fetch interval '{0}' is not a valid number of seconds")]
    InvalidInterval(String),
}

/// Read-only configuration snapshot held by the countdown engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub fetch_url: Url,
    pub fetch_interval: Duration,
    pub notifications_enabled: bool,
    pub launch_at_login: bool,
}

impl Configuration {
    /// Builds a configuration from the string-encoded values of the store.
    pub fn from_raw(
        fetch_url: &str,
        fetch_seconds: &str,
        notifications_enabled: bool,
        launch_at_login: bool,
    ) -> Result<Self, ConfigurationError> {
        Ok(Self {
            fetch_url: parse_fetch_url(fetch_url)?,
            fetch_interval: parse_fetch_interval(fetch_seconds)?,
            notifications_enabled,
            launch_at_login,
        })
    }

    /// Interval encoded the way it is persisted (`"60"`, `"1.5"`).
    pub fn fetch_seconds_string(&self) -> String {
        format_fetch_seconds(self.fetch_interval)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            fetch_url: default_fetch_url(),
            fetch_interval: Duration::from_secs(60),
            notifications_enabled: false,
            launch_at_login: false,
        }
    }
}

fn default_fetch_url() -> Url {
    Url::parse(DEFAULT_FETCH_URL).expect("DEFAULT_FETCH_URL is a valid absolute URL")
}

/// Parses a user-supplied fetch URL. Only absolute http(s) URLs are accepted.
pub fn parse_fetch_url(input: &str) -> Result<Url, ConfigurationError> {
    let trimmed = input.trim();
    let url = Url::parse(trimmed).map_err(|err| ConfigurationError::InvalidUrl {
        input: trimmed.to_string(),
        reason: err.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ConfigurationError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigurationError::InvalidUrl {
            input: trimmed.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}

/// Parses the string-encoded fetch interval in seconds.
pub fn parse_fetch_interval(input: &str) -> Result<Duration, ConfigurationError> {
    let trimmed = input.trim();
    let seconds: f64 = trimmed
        .parse()
        .map_err(|_| ConfigurationError::InvalidInterval(trimmed.to_string()))?;

    if !seconds.is_finite() {
        return Err(ConfigurationError::InvalidInterval(trimmed.to_string()));
    }

    if seconds <= 0.0 {
        return Err(ConfigurationError::NonPositiveInterval(trimmed.to_string()));
    }

    let interval = Duration::try_from_secs_f64(seconds)
        .map_err(|_| ConfigurationError::InvalidInterval(trimmed.to_string()))?;

    if interval < MIN_FETCH_INTERVAL {
        log::debug!(
            "Fetch interval {}s is below the minimum; using {}s",
            seconds,
            MIN_FETCH_INTERVAL.as_secs()
        );
        return Ok(MIN_FETCH_INTERVAL);
    }

    Ok(interval)
}

pub fn format_fetch_seconds(interval: Duration) -> String {
    let seconds = interval.as_secs_f64();
    if seconds.fract() == 0.0 {
        format!("{}", interval.as_secs())
    } else {
        format!("{}", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test]
    fn test_default_configuration_matches_store_defaults() {
        let config = Configuration::default();
        assert_eq!(config.fetch_url.as_str(), DEFAULT_FETCH_URL);
        assert_eq!(config.fetch_seconds_string(), DEFAULT_FETCH_SECONDS);
        assert!(!config.notifications_enabled);
        assert!(!config.launch_at_login);
    }

    #[test]
    fn test_parse_fetch_url_trims_input() {
        let url = parse_fetch_url("  https://example.com/date.txt \n").unwrap();
        assert_eq!(url.as_str(), "https://example.com/date.txt");
    }

    #[test_case("not a url" ; "no scheme")]
    #[test_case("https://" ; "empty host")]
    #[test_case("" ; "empty")]
    fn test_parse_fetch_url_rejects_malformed(input: &str) {
        assert!(matches!(
            parse_fetch_url(input),
            Err(ConfigurationError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_parse_fetch_url_rejects_other_schemes() {
        assert_eq!(
            parse_fetch_url("ftp://example.com/date.txt"),
            Err(ConfigurationError::UnsupportedScheme("ftp".to_string()))
        );
    }

    #[test_case("60", 60_000 ; "whole seconds")]
    #[test_case(" 1.5 ", 1_500 ; "fractional with whitespace")]
    #[test_case("0.2", 1_000 ; "raised to minimum")]
    fn test_parse_fetch_interval(input: &str, expected_ms: u64) {
        assert_eq!(
            parse_fetch_interval(input).unwrap(),
            Duration::from_millis(expected_ms)
        );
    }

    #[test_case("0" ; "zero")]
    #[test_case("-5" ; "negative")]
    fn test_parse_fetch_interval_rejects_non_positive(input: &str) {
        assert!(matches!(
            parse_fetch_interval(input),
            Err(ConfigurationError::NonPositiveInterval(_))
        ));
    }

    #[test_case("soon" ; "text")]
    #[test_case("NaN" ; "nan")]
    #[test_case("inf" ; "infinite")]
    #[test_case("1e300" ; "overflow")]
    fn test_parse_fetch_interval_rejects_invalid(input: &str) {
        assert!(matches!(
            parse_fetch_interval(input),
            Err(ConfigurationError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_format_fetch_seconds() {
        assert_eq!(format_fetch_seconds(Duration::from_secs(90)), "90");
        assert_eq!(format_fetch_seconds(Duration::from_millis(2_500)), "2.5");
    }

    #[test]
    fn test_from_raw_propagates_errors() {
        let err = Configuration::from_raw("https://example.com", "0", false, false).unwrap_err();
        assert_eq!(err, ConfigurationError::NonPositiveInterval("0".to_string()));
    }
}
