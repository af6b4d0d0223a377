use std::time::Duration;

use crate::models::settings::{
    parse_fetch_interval, parse_fetch_url, Configuration, KEY_ENABLE_NOTIFICATION,
    KEY_FETCH_SECONDS, KEY_FETCH_URL, KEY_LAUNCH_AT_LOGIN,
};

/// Maps raw stored values onto a configuration. Missing or invalid values fall
/// back to the defaults with a warning instead of failing the whole load.
pub fn configuration_from_values(
    fetch_url: Option<String>,
    fetch_seconds: Option<String>,
    enable_notification: Option<String>,
    launch_at_login: Option<String>,
) -> Configuration {
    let defaults = Configuration::default();

    let fetch_url = match fetch_url.as_deref().map(parse_fetch_url) {
        Some(Ok(url)) => url,
        Some(Err(err)) => {
            log::warn!("Ignoring stored {}: {}", KEY_FETCH_URL, err);
            defaults.fetch_url.clone()
        }
        None => defaults.fetch_url.clone(),
    };

    let fetch_interval: Duration = match fetch_seconds.as_deref().map(parse_fetch_interval) {
        Some(Ok(interval)) => interval,
        Some(Err(err)) => {
            log::warn!("Ignoring stored {}: {}", KEY_FETCH_SECONDS, err);
            defaults.fetch_interval
        }
        None => defaults.fetch_interval,
    };

    Configuration {
        fetch_url,
        fetch_interval,
        notifications_enabled: bool_or_default(
            KEY_ENABLE_NOTIFICATION,
            enable_notification.as_deref(),
            defaults.notifications_enabled,
        ),
        launch_at_login: bool_or_default(
            KEY_LAUNCH_AT_LOGIN,
            launch_at_login.as_deref(),
            defaults.launch_at_login,
        ),
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

pub fn format_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn bool_or_default(key: &str, value: Option<&str>, default: bool) -> bool {
    match value {
        Some(raw) => parse_bool(raw).unwrap_or_else(|| {
            log::warn!("Ignoring stored {}: '{}' is not a boolean", key, raw);
            default
        }),
        None => default,
    }
}
