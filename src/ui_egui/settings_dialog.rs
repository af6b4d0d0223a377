use egui::{Color32, RichText};

use crate::models::countdown::CountdownSnapshot;
use crate::services::runtime::CountdownHandle;

const LABEL_WIDTH: f32 = 150.0;

/// Form state for the settings window. Text inputs are only committed
/// through their buttons; toggles commit immediately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsDialogState {
    pub url_input: String,
    pub interval_input: String,
    pub notifications_enabled: bool,
    pub launch_at_login: bool,
    pub url_error: Option<String>,
    pub interval_error: Option<String>,
    pub status: Option<String>,
}

impl SettingsDialogState {
    pub fn from_snapshot(snapshot: &CountdownSnapshot) -> Self {
        let config = &snapshot.configuration;
        Self {
            url_input: config.fetch_url.to_string(),
            interval_input: config.fetch_seconds_string(),
            notifications_enabled: config.notifications_enabled,
            launch_at_login: config.launch_at_login,
            ..Self::default()
        }
    }

    /// Validates and commits the URL field.
    pub fn commit_url(&mut self, handle: &CountdownHandle) {
        match handle.set_fetch_url(&self.url_input) {
            Ok(url) => {
                self.url_input = url.to_string();
                self.url_error = None;
                self.status = Some("Fetch URL updated".to_string());
            }
            Err(err) => self.url_error = Some(err.to_string()),
        }
    }

    /// Validates and commits the interval field.
    pub fn commit_interval(&mut self, handle: &CountdownHandle) {
        match handle.set_fetch_interval(&self.interval_input) {
            Ok(_) => {
                self.interval_error = None;
                self.status = Some("Fetch interval saved; takes effect after restart".to_string());
            }
            Err(err) => self.interval_error = Some(err.to_string()),
        }
    }
}

/// Render the settings form into `ui`.
pub fn render_settings_dialog(
    ui: &mut egui::Ui,
    state: &mut SettingsDialogState,
    snapshot: &CountdownSnapshot,
    handle: &CountdownHandle,
) {
    ui.heading("Countdown");
    ui.add_space(4.0);
    ui.label(RichText::new(snapshot.display_text()).size(20.0).strong());
    ui.label(format!("ISO8601: {}", snapshot.raw_text()));
    ui.add_space(12.0);

    ui.heading("Fetch");
    ui.add_space(4.0);

    labeled_row(ui, "Fetch URL:", |ui| {
        let response = ui.add(egui::TextEdit::singleline(&mut state.url_input).desired_width(260.0));
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Update").clicked() || submitted {
            state.commit_url(handle);
        }
    });
    inline_error(ui, state.url_error.as_deref());

    labeled_row(ui, "Fetch interval (s):", |ui| {
        ui.add(egui::TextEdit::singleline(&mut state.interval_input).desired_width(80.0));
        if ui.button("Apply").clicked() {
            state.commit_interval(handle);
        }
    });
    inline_error(ui, state.interval_error.as_deref());

    ui.add_space(12.0);
    ui.heading("Notifications");
    ui.add_space(4.0);

    if ui
        .checkbox(
            &mut state.notifications_enabled,
            "Notify when the countdown finishes",
        )
        .changed()
    {
        handle.set_notifications_enabled(state.notifications_enabled);
    }
    if ui.button("Send Test Notification").clicked() {
        handle.send_test_notification();
    }

    ui.add_space(12.0);
    ui.heading("General");
    ui.add_space(4.0);

    if ui
        .checkbox(&mut state.launch_at_login, "Launch at login")
        .changed()
    {
        handle.set_launch_at_login(state.launch_at_login);
    }

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui.button("Refresh Date Information").clicked() {
            handle.refresh_now();
        }
        if let Some(status) = &state.status {
            ui.label(RichText::new(status).weak());
        }
    });
}

fn labeled_row(ui: &mut egui::Ui, label: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        ui.allocate_ui_with_layout(
            egui::Vec2::new(LABEL_WIDTH, 20.0),
            egui::Layout::right_to_left(egui::Align::Center),
            |ui| {
                ui.label(label);
            },
        );
        add_contents(ui);
    });
}

fn inline_error(ui: &mut egui::Ui, error: Option<&str>) {
    if let Some(error) = error {
        ui.horizontal(|ui| {
            ui.add_space(LABEL_WIDTH);
            ui.colored_label(Color32::LIGHT_RED, error);
        });
    }
}
