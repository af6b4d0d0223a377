// Countdown module
// State, fetch outcomes and notification intents exchanged by the countdown services

use chrono::{DateTime, Utc};
use reqwest::Url;

use super::settings::Configuration;

pub const FINISH_NOTIFICATION_ID: &str = "countdown-finished";
pub const TEST_NOTIFICATION_ID: &str = "countdown-test";

/// Outcome of one fetch cycle. Consumed exactly once by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Success {
        target: DateTime<Utc>,
        raw: String,
    },
    NetworkFailure,
    ParseFailure {
        raw: String,
    },
}

impl FetchResult {
    pub fn label(&self) -> &'static str {
        match self {
            FetchResult::Success { .. } => "success",
            FetchResult::NetworkFailure => "network failure",
            FetchResult::ParseFailure { .. } => "parse failure",
        }
    }
}

/// Monotonic number stamped on every issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchSequence(pub u64);

/// A fetch the engine wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub sequence: FetchSequence,
    pub url: Url,
}

/// Target instant, the last normalized body and the derived display string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownState {
    pub target: Option<DateTime<Utc>>,
    pub raw_text: String,
    pub display_text: String,
}

/// Published after every engine transition.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownSnapshot {
    pub state: CountdownState,
    pub configuration: Configuration,
}

impl CountdownSnapshot {
    pub fn display_text(&self) -> &str {
        &self.state.display_text
    }

    pub fn raw_text(&self) -> &str {
        &self.state.raw_text
    }
}

/// A local alert scheduled for a future instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationIntent {
    pub identifier: String,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

impl NotificationIntent {
    pub fn countdown_finished(fire_at: DateTime<Utc>) -> Self {
        Self {
            identifier: FINISH_NOTIFICATION_ID.to_string(),
            fire_at,
            title: "Countdown Finished".to_string(),
            body: "The countdown has reached zero.".to_string(),
        }
    }

    pub fn test(fire_at: DateTime<Utc>) -> Self {
        Self {
            identifier: TEST_NOTIFICATION_ID.to_string(),
            fire_at,
            title: "Test Notification".to_string(),
            body: "Notifications from MenuBarCountdown are working.".to_string(),
        }
    }
}
