//! The countdown state machine.
//!
//! The engine is synchronous and clock-free: every operation that depends on
//! the wall clock takes `now` explicitly, and network work is handed out as
//! [`FetchTicket`]s that the caller performs and feeds back through
//! [`CountdownEngine::on_fetch_completed`].

use chrono::{DateTime, Utc};
use reqwest::Url;

use super::display::format_countdown;
use crate::models::countdown::{
    CountdownSnapshot, CountdownState, FetchResult, FetchSequence, FetchTicket, NotificationIntent,
};
use crate::models::settings::Configuration;
use crate::services::fetcher::redact_url;
use crate::services::notification::NotificationGateway;

pub const LOADING_TEXT: &str = "Loading...";
pub const NOT_AVAILABLE_TEXT: &str = "Not Available";
pub const FETCH_FAILED_TEXT: &str = "Failed to Fetch Date";
pub const PARSE_FAILED_TEXT: &str = "Failed to Parse Date";

pub struct CountdownEngine {
    pub(super) config: Configuration,
    pub(super) state: CountdownState,
    pub(super) notifier: Box<dyn NotificationGateway>,
    /// Last finish alert handed to the gateway.
    pub(super) pending_finish: Option<NotificationIntent>,
    next_sequence: u64,
    highest_applied: Option<FetchSequence>,
}

impl CountdownEngine {
    pub fn new(config: Configuration, notifier: Box<dyn NotificationGateway>) -> Self {
        Self {
            config,
            state: CountdownState {
                target: None,
                raw_text: String::new(),
                display_text: LOADING_TEXT.to_string(),
            },
            notifier,
            pending_finish: None,
            next_sequence: 0,
            highest_applied: None,
        }
    }

    /// Creates the engine and issues the eager startup fetch.
    pub fn initialize(
        config: Configuration,
        notifier: Box<dyn NotificationGateway>,
    ) -> (Self, FetchTicket) {
        let mut engine = Self::new(config, notifier);
        let ticket = engine.refresh_now();
        log::info!(
            "Countdown engine initialized; fetching from {} every {}s",
            redact_url(&engine.config.fetch_url),
            engine.config.fetch_seconds_string()
        );
        (engine, ticket)
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn state(&self) -> &CountdownState {
        &self.state
    }

    pub fn snapshot(&self) -> CountdownSnapshot {
        CountdownSnapshot {
            state: self.state.clone(),
            configuration: self.config.clone(),
        }
    }

    /// Replaces the configuration snapshot with freshly loaded values.
    /// The notification flag only changes through `set_notifications_enabled`.
    pub fn update_configuration(&mut self, config: Configuration) {
        let notifications_enabled = self.config.notifications_enabled;
        self.config = Configuration {
            notifications_enabled,
            ..config
        };
    }

    /// Issues a new fetch outside the regular cadence.
    pub fn refresh_now(&mut self) -> FetchTicket {
        self.next_sequence += 1;
        FetchTicket {
            sequence: FetchSequence(self.next_sequence),
            url: self.config.fetch_url.clone(),
        }
    }

    pub fn on_fetch_url_changed(&mut self, url: Url) -> FetchTicket {
        log::info!("Fetch URL changed to {}", redact_url(&url));
        self.config.fetch_url = url;
        self.refresh_now()
    }

    pub fn on_tick(&mut self, now: DateTime<Utc>) {
        self.state.display_text = match self.state.target {
            Some(target) => format_countdown(target, now),
            None => NOT_AVAILABLE_TEXT.to_string(),
        };
    }

    /// Applies a completed fetch. Returns `false` when the completion is stale
    /// (an already applied fetch was issued after it) and was discarded.
    pub fn on_fetch_completed(
        &mut self,
        result: FetchResult,
        sequence: FetchSequence,
        now: DateTime<Utc>,
    ) -> bool {
        if self.highest_applied.is_some_and(|applied| sequence < applied) {
            log::debug!(
                "Discarding stale fetch #{} ({}); #{} already applied",
                sequence.0,
                result.label(),
                self.highest_applied.map_or(0, |s| s.0)
            );
            return false;
        }
        self.highest_applied = Some(sequence);

        match result {
            FetchResult::Success { target, raw } => {
                log::info!("Fetched target date {}", target.to_rfc3339());
                self.state.target = Some(target);
                self.state.raw_text = raw;
                self.on_tick(now);

                if self.config.notifications_enabled {
                    self.schedule_finish_notification(target, now);
                } else {
                    self.cancel_finish_notification();
                }
            }
            FetchResult::NetworkFailure => {
                self.state.display_text = FETCH_FAILED_TEXT.to_string();
            }
            FetchResult::ParseFailure { raw } => {
                self.state.raw_text = raw;
                self.state.display_text = PARSE_FAILED_TEXT.to_string();
            }
        }

        true
    }
}
