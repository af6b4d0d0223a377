//! Notification orchestration for the countdown engine.
//!
//! At most one finish alert is pending at a time. Scheduling always goes
//! through the authorization check: granted schedules directly, undetermined
//! asks first and schedules only on grant, denied is a silent no-op.

use chrono::{DateTime, Duration, Utc};

use super::engine::CountdownEngine;
use crate::models::countdown::{NotificationIntent, FINISH_NOTIFICATION_ID, TEST_NOTIFICATION_ID};
use crate::services::notification::NotificationAuthorization;

/// Minimum lead time for any scheduled alert.
const MIN_FIRE_DELAY_SECONDS: i64 = 1;

impl CountdownEngine {
    /// Toggles the finish alert. Enabling also sends a one-shot test alert.
    pub fn set_notifications_enabled(&mut self, enabled: bool, now: DateTime<Utc>) {
        self.config.notifications_enabled = enabled;
        log::info!(
            "Notifications {}",
            if enabled { "enabled" } else { "disabled" }
        );

        if enabled {
            if let Some(target) = self.state.target {
                self.schedule_finish_notification(target, now);
            }
            self.send_test_notification(now);
        } else {
            self.cancel_finish_notification();
        }
    }

    /// Schedules the test alert about one second from `now`.
    pub fn send_test_notification(&mut self, now: DateTime<Utc>) {
        let intent = NotificationIntent::test(clamp_fire_at(now, now));
        self.schedule_authorized(intent);
    }

    /// The finish alert currently handed to the gateway, if any.
    pub fn pending_finish_notification(&self) -> Option<&NotificationIntent> {
        self.pending_finish.as_ref()
    }

    pub(super) fn schedule_finish_notification(&mut self, target: DateTime<Utc>, now: DateTime<Utc>) {
        let intent = NotificationIntent::countdown_finished(clamp_fire_at(target, now));
        self.pending_finish = if self.schedule_authorized(intent.clone()) {
            Some(intent)
        } else {
            None
        };
    }

    pub(super) fn cancel_finish_notification(&mut self) {
        self.notifier.cancel(FINISH_NOTIFICATION_ID);
        if self.pending_finish.take().is_some() {
            log::debug!("Cancelled pending finish notification");
        }
    }

    /// Cancel-then-add under the authorization rules. Returns whether the
    /// intent was handed to the gateway.
    fn schedule_authorized(&self, intent: NotificationIntent) -> bool {
        if !self.is_authorized() {
            log::debug!(
                "Notification '{}' skipped: not authorized",
                intent.identifier
            );
            return false;
        }

        self.notifier.cancel(&intent.identifier);
        match self.notifier.schedule(&intent) {
            Ok(()) => {
                log::info!(
                    "Scheduled notification '{}' for {}",
                    intent.identifier,
                    intent.fire_at.to_rfc3339()
                );
                true
            }
            Err(err) => {
                log::warn!("Failed to schedule notification '{}': {:#}", intent.identifier, err);
                false
            }
        }
    }

    fn is_authorized(&self) -> bool {
        match self.notifier.authorization_status() {
            NotificationAuthorization::Granted => true,
            NotificationAuthorization::NotDetermined => {
                self.notifier.request_authorization() == NotificationAuthorization::Granted
            }
            NotificationAuthorization::Denied => false,
        }
    }
}

/// Never schedule at or before `now`.
fn clamp_fire_at(fire_at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    fire_at.max(now + Duration::seconds(MIN_FIRE_DELAY_SECONDS))
}
