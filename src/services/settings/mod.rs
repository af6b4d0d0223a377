// Settings service module
// Durable key/value configuration consumed by the countdown runtime

mod mapper;
mod service;

use anyhow::Result;

use crate::models::settings::{
    Configuration, KEY_ENABLE_NOTIFICATION, KEY_FETCH_SECONDS, KEY_FETCH_URL, KEY_LAUNCH_AT_LOGIN,
};

pub use mapper::{configuration_from_values, format_bool, parse_bool};
pub use service::SettingsService;

/// Process-wide key/value configuration store.
///
/// Only `get` and `set` touch storage; the typed `load`/`save` pair maps the
/// four countdown keys onto a [`Configuration`].
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Reads the configuration, replacing invalid or missing values by defaults.
    fn load(&self) -> Result<Configuration> {
        Ok(configuration_from_values(
            self.get(KEY_FETCH_URL)?,
            self.get(KEY_FETCH_SECONDS)?,
            self.get(KEY_ENABLE_NOTIFICATION)?,
            self.get(KEY_LAUNCH_AT_LOGIN)?,
        ))
    }

    fn save(&mut self, config: &Configuration) -> Result<()> {
        self.set(KEY_FETCH_URL, config.fetch_url.as_str())?;
        self.set(KEY_FETCH_SECONDS, &config.fetch_seconds_string())?;
        self.set(KEY_ENABLE_NOTIFICATION, format_bool(config.notifications_enabled))?;
        self.set(KEY_LAUNCH_AT_LOGIN, format_bool(config.launch_at_login))?;
        Ok(())
    }
}
