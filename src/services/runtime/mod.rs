//! The serialized execution context that hosts the countdown engine.
//!
//! One tokio task owns the engine, the settings store, the refresh scheduler
//! and every in-flight fetch. Commands from the presentation layer, scheduler
//! triggers and fetch completions are all handled inside a single `select!`
//! loop, so no two state transitions ever overlap. Snapshots are published on
//! a `watch` channel after every transition.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Url;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::models::countdown::{CountdownSnapshot, FetchResult, FetchSequence, FetchTicket};
use crate::models::settings::{
    format_fetch_seconds, parse_fetch_interval, parse_fetch_url, Configuration,
    ConfigurationError, KEY_ENABLE_NOTIFICATION, KEY_FETCH_SECONDS, KEY_FETCH_URL,
    KEY_LAUNCH_AT_LOGIN,
};
use crate::services::autostart::LoginItemRegistrar;
use crate::services::countdown::CountdownEngine;
use crate::services::fetcher::{redact_url, DateSource};
use crate::services::notification::NotificationGateway;
use crate::services::scheduler::{RefreshScheduler, Trigger};
use crate::services::settings::{format_bool, SettingsStore};

#[derive(Debug, Clone, PartialEq)]
enum Command {
    RefreshNow,
    SetFetchUrl(Url),
    SetFetchInterval(Duration),
    SetNotifications(bool),
    SetLaunchAtLogin(bool),
    SendTestNotification,
    Shutdown,
}

/// Cloneable front door to a running countdown.
///
/// Every method returns immediately; the work happens on the runtime task.
/// Setters validate their input here so that malformed values are rejected
/// at the settings boundary and never reach the engine.
#[derive(Clone)]
pub struct CountdownHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshots: watch::Receiver<CountdownSnapshot>,
}

impl CountdownHandle {
    pub fn refresh_now(&self) {
        self.send(Command::RefreshNow);
    }

    /// Commits a new fetch URL. Any accepted commit triggers a refetch, even
    /// when the value is unchanged.
    pub fn set_fetch_url(&self, input: &str) -> Result<Url, ConfigurationError> {
        let url = parse_fetch_url(input)?;
        self.send(Command::SetFetchUrl(url.clone()));
        Ok(url)
    }

    /// Commits a new fetch interval. The running fetch cadence keeps its
    /// period until the next start.
    pub fn set_fetch_interval(&self, input: &str) -> Result<Duration, ConfigurationError> {
        let interval = parse_fetch_interval(input)?;
        self.send(Command::SetFetchInterval(interval));
        Ok(interval)
    }

    pub fn set_notifications_enabled(&self, enabled: bool) {
        self.send(Command::SetNotifications(enabled));
    }

    pub fn set_launch_at_login(&self, enabled: bool) {
        self.send(Command::SetLaunchAtLogin(enabled));
    }

    pub fn send_test_notification(&self) {
        self.send(Command::SendTestNotification);
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> CountdownSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CountdownSnapshot> {
        self.snapshots.clone()
    }

    /// Asks the runtime to stop. Use [`CountdownRuntime::shutdown`] to also
    /// wait for it.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::debug!("Countdown runtime has stopped; command dropped");
        }
    }
}

/// Owner of the runtime task.
pub struct CountdownRuntime {
    handle: CountdownHandle,
    task: JoinHandle<()>,
}

impl CountdownRuntime {
    /// Loads the configuration, issues the eager startup fetch and starts both
    /// scheduler triggers on `runtime`.
    pub fn spawn<S: DateSource>(
        runtime: &Handle,
        source: S,
        store: Box<dyn SettingsStore>,
        notifier: Box<dyn NotificationGateway>,
        autostart: Option<Box<dyn LoginItemRegistrar>>,
    ) -> Result<Self> {
        let config = store
            .load()
            .context("Failed to load countdown configuration")?;

        // Timers must be created inside the runtime.
        let _guard = runtime.enter();
        let scheduler = RefreshScheduler::new(config.fetch_interval)
            .context("Invalid fetch interval")?;

        let (engine, ticket) = CountdownEngine::initialize(config, notifier);
        let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let actor = CountdownActor {
            engine,
            store,
            source: Arc::new(source),
            scheduler,
            autostart,
            in_flight: JoinSet::new(),
            unsaved: HashSet::new(),
            snapshots: snapshot_tx,
        };
        let task = runtime.spawn(actor.run(command_rx, ticket));

        Ok(Self {
            handle: CountdownHandle {
                commands: command_tx,
                snapshots: snapshot_rx,
            },
            task,
        })
    }

    pub fn handle(&self) -> CountdownHandle {
        self.handle.clone()
    }

    /// Stops both triggers, drops in-flight fetches and waits for the loop
    /// to exit.
    pub async fn shutdown(self) {
        self.handle.shutdown();
        if let Err(err) = self.task.await {
            log::warn!("Countdown runtime task ended abnormally: {}", err);
        }
    }
}

struct CountdownActor<S: DateSource> {
    engine: CountdownEngine,
    store: Box<dyn SettingsStore>,
    source: Arc<S>,
    scheduler: RefreshScheduler,
    autostart: Option<Box<dyn LoginItemRegistrar>>,
    in_flight: JoinSet<(FetchSequence, FetchResult)>,
    /// Keys whose last commit failed to persist; reloads keep the engine's value.
    unsaved: HashSet<&'static str>,
    snapshots: watch::Sender<CountdownSnapshot>,
}

impl<S: DateSource> CountdownActor<S> {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, startup: FetchTicket) {
        log::info!("Countdown runtime started");
        self.apply_launch_at_login();
        self.dispatch(startup);

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                trigger = self.scheduler.next() => self.handle_trigger(trigger),
                Some(joined) = self.in_flight.join_next() => self.handle_completion(joined),
            }
            self.publish();
        }

        let abandoned = self.in_flight.len();
        self.in_flight.shutdown().await;
        log::info!(
            "Countdown runtime stopped ({} in-flight fetches discarded)",
            abandoned
        );
    }

    fn handle_command(&mut self, command: Command) {
        log::debug!("Handling command {:?}", command);
        match command {
            Command::RefreshNow => {
                let ticket = self.engine.refresh_now();
                self.dispatch(ticket);
            }
            Command::SetFetchUrl(url) => {
                self.persist(KEY_FETCH_URL, url.as_str());
                let ticket = self.engine.on_fetch_url_changed(url);
                self.dispatch(ticket);
            }
            Command::SetFetchInterval(interval) => {
                self.persist(KEY_FETCH_SECONDS, &format_fetch_seconds(interval));
                self.engine.update_configuration(Configuration {
                    fetch_interval: interval,
                    ..self.engine.config().clone()
                });
                if interval != self.scheduler.fetch_period() {
                    log::info!(
                        "Fetch interval set to {}s; takes effect after restart",
                        format_fetch_seconds(interval)
                    );
                }
            }
            Command::SetNotifications(enabled) => {
                self.persist(KEY_ENABLE_NOTIFICATION, format_bool(enabled));
                self.engine.set_notifications_enabled(enabled, Utc::now());
            }
            Command::SetLaunchAtLogin(enabled) => {
                self.persist(KEY_LAUNCH_AT_LOGIN, format_bool(enabled));
                self.engine.update_configuration(Configuration {
                    launch_at_login: enabled,
                    ..self.engine.config().clone()
                });
                self.apply_launch_at_login();
            }
            Command::SendTestNotification => {
                self.engine.send_test_notification(Utc::now());
            }
            Command::Shutdown => {}
        }
    }

    fn handle_trigger(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Tick => self.engine.on_tick(Utc::now()),
            Trigger::Fetch => {
                self.reload_configuration();
                let ticket = self.engine.refresh_now();
                self.dispatch(ticket);
            }
        }
    }

    fn handle_completion(&mut self, joined: Result<(FetchSequence, FetchResult), JoinError>) {
        match joined {
            Ok((sequence, result)) => {
                self.engine.on_fetch_completed(result, sequence, Utc::now());
            }
            Err(err) if err.is_cancelled() => log::debug!("Fetch task cancelled"),
            Err(err) => log::warn!("Fetch task failed: {}", err),
        }
    }

    fn dispatch(&mut self, ticket: FetchTicket) {
        log::debug!(
            "Issuing fetch #{} to {}",
            ticket.sequence.0,
            redact_url(&ticket.url)
        );
        let source = Arc::clone(&self.source);
        self.in_flight.spawn(async move {
            let result = source.fetch(ticket.url).await;
            (ticket.sequence, result)
        });
    }

    fn reload_configuration(&mut self) {
        match self.store.load() {
            Ok(mut config) => {
                let current = self.engine.config();
                if self.unsaved.contains(KEY_FETCH_URL) {
                    config.fetch_url = current.fetch_url.clone();
                }
                if self.unsaved.contains(KEY_FETCH_SECONDS) {
                    config.fetch_interval = current.fetch_interval;
                }
                if self.unsaved.contains(KEY_LAUNCH_AT_LOGIN) {
                    config.launch_at_login = current.launch_at_login;
                }
                self.engine.update_configuration(config);
            }
            Err(err) => log::error!("Failed to reload settings: {:#}", err),
        }
    }

    fn persist(&mut self, key: &'static str, value: &str) {
        match self.store.set(key, value) {
            Ok(()) => {
                self.unsaved.remove(key);
            }
            Err(err) => {
                log::error!("Failed to persist setting '{}': {:#}", key, err);
                self.unsaved.insert(key);
            }
        }
    }

    fn apply_launch_at_login(&self) {
        let Some(registrar) = &self.autostart else {
            return;
        };
        let enabled = self.engine.config().launch_at_login;
        if let Err(err) = registrar.set_enabled(enabled) {
            log::warn!("Failed to update launch at login: {:#}", err);
        }
    }

    fn publish(&self) {
        let next = self.engine.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
