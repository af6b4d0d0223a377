// Test fixtures - reusable test data and collaborators
// Provides scripted date sources and recording gateways across test files

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use menubar_countdown::models::countdown::{FetchResult, NotificationIntent};
use menubar_countdown::services::fetcher::DateSource;
use menubar_countdown::services::notification::{NotificationAuthorization, NotificationGateway};
use reqwest::Url;

/// Sample instants for testing
pub mod dates {
    use chrono::{DateTime, TimeZone, Utc};

    /// Far enough ahead that every test counts down
    pub fn far_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap()
    }

    pub fn later_future() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(3001, 6, 15, 12, 0, 0).unwrap()
    }

    pub fn distant_past() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap()
    }
}

pub fn success(target: chrono::DateTime<chrono::Utc>) -> FetchResult {
    FetchResult::Success {
        target,
        raw: target.to_rfc3339(),
    }
}

/// A date source that replays a fixed script, one step per fetch. Each step
/// completes after its delay. Fetches past the end of the script fail.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<(Duration, FetchResult)>>>,
    requests: Arc<Mutex<Vec<Url>>>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<(Duration, FetchResult)>) -> Self {
        Self {
            script: Arc::new(Mutex::new(steps.into())),
            requests: Arc::default(),
        }
    }

    pub fn immediate(results: Vec<FetchResult>) -> Self {
        Self::new(results.into_iter().map(|r| (Duration::ZERO, r)).collect())
    }

    pub fn requests(&self) -> Vec<Url> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl DateSource for ScriptedSource {
    async fn fetch(&self, url: Url) -> FetchResult {
        self.requests.lock().unwrap().push(url);
        let step = self.script.lock().unwrap().pop_front();

        match step {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => FetchResult::NetworkFailure,
        }
    }
}

/// A granted gateway that records what it was asked to do.
#[derive(Clone)]
pub struct RecordingGateway {
    authorization: NotificationAuthorization,
    scheduled: Arc<Mutex<Vec<NotificationIntent>>>,
    cancelled: Arc<Mutex<Vec<String>>>,
}

impl RecordingGateway {
    pub fn granted() -> Self {
        Self::with_authorization(NotificationAuthorization::Granted)
    }

    pub fn with_authorization(authorization: NotificationAuthorization) -> Self {
        Self {
            authorization,
            scheduled: Arc::default(),
            cancelled: Arc::default(),
        }
    }

    pub fn scheduled(&self) -> Vec<NotificationIntent> {
        self.scheduled.lock().unwrap().clone()
    }

    pub fn scheduled_ids(&self) -> Vec<String> {
        self.scheduled()
            .into_iter()
            .map(|intent| intent.identifier)
            .collect()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }
}

impl NotificationGateway for RecordingGateway {
    fn authorization_status(&self) -> NotificationAuthorization {
        self.authorization
    }

    fn request_authorization(&self) -> NotificationAuthorization {
        self.authorization
    }

    fn schedule(&self, intent: &NotificationIntent) -> Result<()> {
        self.scheduled.lock().unwrap().push(intent.clone());
        Ok(())
    }

    fn cancel(&self, identifier: &str) {
        self.cancelled.lock().unwrap().push(identifier.to_string());
    }
}

/// Polls `condition` on the paused clock until it holds or `limit` passes.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
