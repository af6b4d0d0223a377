// MenuBar Countdown Application
// Main entry point

use anyhow::{anyhow, Context, Result};
use menubar_countdown::services::autostart::{AutostartService, LoginItemRegistrar};
use menubar_countdown::services::database::resolve_database_path;
use menubar_countdown::services::fetcher::HttpDateFetcher;
use menubar_countdown::services::notification::DesktopNotificationGateway;
use menubar_countdown::services::runtime::CountdownRuntime;
use menubar_countdown::services::settings::SettingsService;
use menubar_countdown::ui_egui::CountdownApp;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting MenuBar Countdown");

    let tokio = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    let store = SettingsService::open(&resolve_database_path())?;

    let autostart: Option<Box<dyn LoginItemRegistrar>> = match AutostartService::new() {
        Ok(service) => Some(Box::new(service)),
        Err(err) => {
            log::warn!("Launch at login unavailable: {:#}", err);
            None
        }
    };

    let runtime = CountdownRuntime::spawn(
        tokio.handle(),
        HttpDateFetcher::new()?,
        Box::new(store),
        Box::new(DesktopNotificationGateway::new(tokio.handle().clone())),
        autostart,
    )?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MenuBar Countdown Settings")
            .with_inner_size([520.0, 420.0])
            .with_visible(false),
        ..Default::default()
    };

    let handle = tokio.handle().clone();
    eframe::run_native(
        "MenuBar Countdown",
        native_options,
        Box::new(move |cc| Ok(Box::new(CountdownApp::new(cc, runtime, handle)))),
    )
    .map_err(|err| anyhow!("failed to start MenuBar Countdown: {err}"))?;

    tokio.shutdown_timeout(std::time::Duration::from_secs(1));
    log::info!("MenuBar Countdown exited");
    Ok(())
}
