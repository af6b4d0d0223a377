use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::models::countdown::CountdownSnapshot;
use crate::services::runtime::{CountdownHandle, CountdownRuntime};
use crate::ui_egui::settings_dialog::{render_settings_dialog, SettingsDialogState};
use crate::ui_egui::tray::{CountdownTray, TrayAction};

/// Menu events are only seen when a frame runs.
const TRAY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Top-level application object. Owns the countdown runtime, the tray item
/// and the settings window (the root viewport, hidden until requested).
pub struct CountdownApp {
    runtime: Option<CountdownRuntime>,
    handle: CountdownHandle,
    tokio: Handle,
    snapshots: watch::Receiver<CountdownSnapshot>,
    tray: Option<CountdownTray>,
    settings: SettingsDialogState,
    exit_requested: bool,
}

impl CountdownApp {
    pub fn new(cc: &eframe::CreationContext<'_>, runtime: CountdownRuntime, tokio: Handle) -> Self {
        let handle = runtime.handle();
        let snapshots = handle.subscribe();
        let snapshot = handle.snapshot();

        let tray = match CountdownTray::new(&snapshot) {
            Ok(tray) => Some(tray),
            Err(err) => {
                log::warn!("{:#}; showing the settings window instead", err);
                None
            }
        };

        // Without a tray item the window is the only way in.
        if tray.is_none() {
            cc.egui_ctx
                .send_viewport_cmd(egui::ViewportCommand::Visible(true));
        }

        spawn_repaint_forwarder(&tokio, handle.subscribe(), cc.egui_ctx.clone());

        Self {
            runtime: Some(runtime),
            settings: SettingsDialogState::from_snapshot(&snapshot),
            handle,
            tokio,
            snapshots,
            tray,
            exit_requested: false,
        }
    }

    fn handle_tray_action(&mut self, ctx: &egui::Context, action: TrayAction) {
        log::debug!("Tray action {:?}", action);
        match action {
            TrayAction::Refresh => self.handle.refresh_now(),
            TrayAction::OpenSettings => {
                self.settings = SettingsDialogState::from_snapshot(&self.handle.snapshot());
                ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
                ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            }
            TrayAction::Quit => {
                self.exit_requested = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    /// Closing the settings window hides it; only Quit ends the app.
    fn handle_close_to_tray(&mut self, ctx: &egui::Context) {
        let close_requested = ctx.input(|i| i.viewport().close_requested());

        if close_requested && self.tray.is_some() && !self.exit_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
            log::debug!("Settings window hidden");
        }
    }
}

impl eframe::App for CountdownApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let actions = self
            .tray
            .as_ref()
            .map(CountdownTray::poll_actions)
            .unwrap_or_default();
        for action in actions {
            self.handle_tray_action(ctx, action);
        }

        let snapshot = self.snapshots.borrow_and_update().clone();
        if let Some(tray) = self.tray.as_mut() {
            tray.update(&snapshot);
        }

        self.handle_close_to_tray(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            render_settings_dialog(ui, &mut self.settings, &snapshot, &self.handle);
        });

        ctx.request_repaint_after(TRAY_POLL_INTERVAL);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(runtime) = self.runtime.take() {
            log::info!("Shutting down countdown runtime");
            self.tokio.block_on(runtime.shutdown());
        }
    }
}

/// Wakes the UI whenever the runtime publishes, so the tray label keeps up
/// while the window is hidden.
fn spawn_repaint_forwarder(
    runtime: &Handle,
    mut updates: watch::Receiver<CountdownSnapshot>,
    ctx: egui::Context,
) {
    runtime.spawn(async move {
        while updates.changed().await.is_ok() {
            ctx.request_repaint();
        }
    });
}
