use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use chrono::Utc;
use notify_rust::{Notification, Timeout};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::models::countdown::NotificationIntent;

const APP_NAME: &str = "MenuBarCountdown";

/// Permission state reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAuthorization {
    Granted,
    Denied,
    NotDetermined,
}

/// Permission check, scheduling and cancellation of local alerts.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationGateway: Send {
    fn authorization_status(&self) -> NotificationAuthorization;

    /// Asks the user (or platform) for permission; returns the resulting state.
    fn request_authorization(&self) -> NotificationAuthorization;

    /// Schedules `intent`, replacing any pending alert with the same identifier.
    fn schedule(&self, intent: &NotificationIntent) -> Result<()>;

    fn cancel(&self, identifier: &str);
}

/// Desktop notifications through `notify-rust`.
///
/// Desktop notification daemons cannot hold alerts for a future instant, so
/// each identifier gets one task that sleeps until `fire_at` and then shows
/// the alert. Scheduling an identifier aborts its previous task.
pub struct DesktopNotificationGateway {
    runtime: Handle,
    authorization: NotificationAuthorization,
    pending: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl DesktopNotificationGateway {
    /// Desktop platforms without a permission model report `Granted`.
    pub fn new(runtime: Handle) -> Self {
        Self::with_authorization(runtime, NotificationAuthorization::Granted)
    }

    pub fn with_authorization(runtime: Handle, authorization: NotificationAuthorization) -> Self {
        Self {
            runtime,
            authorization,
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of alerts waiting to fire.
    pub fn pending_count(&self) -> usize {
        self.lock_pending()
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<String, JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl NotificationGateway for DesktopNotificationGateway {
    fn authorization_status(&self) -> NotificationAuthorization {
        self.authorization
    }

    fn request_authorization(&self) -> NotificationAuthorization {
        self.authorization
    }

    fn schedule(&self, intent: &NotificationIntent) -> Result<()> {
        let delay = (intent.fire_at - Utc::now())
            .to_std()
            .unwrap_or_default();
        let identifier = intent.identifier.clone();
        let title = intent.title.clone();
        let body = intent.body.clone();

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            let shown = tokio::task::spawn_blocking(move || {
                Notification::new()
                    .appname(APP_NAME)
                    .summary(&title)
                    .body(&body)
                    .timeout(Timeout::Milliseconds(5000))
                    .show()
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            })
            .await;

            match shown {
                Ok(Ok(())) => log::info!("Delivered notification '{}'", identifier),
                Ok(Err(err)) => log::warn!("Failed to show notification '{}': {}", identifier, err),
                Err(err) => log::warn!("Notification task '{}' did not finish: {}", identifier, err),
            }
        });

        if let Some(previous) = self.lock_pending().insert(intent.identifier.clone(), task) {
            previous.abort();
        }

        log::debug!(
            "Scheduled notification '{}' in {}s",
            intent.identifier,
            delay.as_secs()
        );
        Ok(())
    }

    fn cancel(&self, identifier: &str) {
        if let Some(task) = self.lock_pending().remove(identifier) {
            task.abort();
            log::debug!("Cancelled notification '{}'", identifier);
        }
    }
}

impl Drop for DesktopNotificationGateway {
    fn drop(&mut self) {
        for (_, task) in self.lock_pending().drain() {
            task.abort();
        }
    }
}
