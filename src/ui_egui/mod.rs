mod app;
mod settings_dialog;
mod tray;

pub use app::CountdownApp;
pub use settings_dialog::SettingsDialogState;
pub use tray::TrayAction;
