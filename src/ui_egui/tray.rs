use anyhow::{Context, Result};
use tray_icon::menu::{Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::models::countdown::CountdownSnapshot;

const ICON_SIZE: u32 = 32;
const RAW_TEXT_PREFIX: &str = "ISO8601: ";

/// Menu commands the app reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    Refresh,
    OpenSettings,
    Quit,
}

/// The menu-bar item: a label showing the countdown and a dropdown menu.
pub struct CountdownTray {
    tray_icon: TrayIcon,
    display_item: MenuItem,
    raw_item: MenuItem,
    refresh_id: MenuId,
    settings_id: MenuId,
    quit_id: MenuId,
    shown_text: String,
}

impl CountdownTray {
    /// Builds the tray item. Fails when no tray host is available.
    pub fn new(snapshot: &CountdownSnapshot) -> Result<Self> {
        // GTK must be initialised before tray-icon creates menus on Linux
        #[cfg(target_os = "linux")]
        gtk::init().context("Failed to initialise GTK for the tray")?;

        let display_item = MenuItem::new(snapshot.display_text(), false, None);
        let raw_item = MenuItem::new(raw_label(snapshot), false, None);
        let refresh_item = MenuItem::new("Refresh Date Information", true, None);
        let settings_item = MenuItem::new("Settings...", true, None);
        let quit_item = MenuItem::new("Quit", true, None);

        let menu = Menu::new();
        menu.append_items(&[
            &display_item,
            &raw_item,
            &PredefinedMenuItem::separator(),
            &refresh_item,
            &settings_item,
            &PredefinedMenuItem::separator(),
            &quit_item,
        ])
        .context("Failed to build tray menu")?;

        let icon = Icon::from_rgba(countdown_icon_rgba(ICON_SIZE), ICON_SIZE, ICON_SIZE)
            .context("Failed to create tray icon from RGBA data")?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(snapshot.display_text())
            .with_title(snapshot.display_text())
            .with_icon(icon)
            .with_menu(Box::new(menu))
            .build()
            .context("Failed to create tray icon (tray host may not be available)")?;

        log::info!("Tray icon created");

        Ok(Self {
            tray_icon,
            display_item,
            raw_item,
            refresh_id: refresh_item.id().clone(),
            settings_id: settings_item.id().clone(),
            quit_id: quit_item.id().clone(),
            shown_text: snapshot.display_text().to_string(),
        })
    }

    /// Mirrors the snapshot into the label and menu. No-op when unchanged.
    pub fn update(&mut self, snapshot: &CountdownSnapshot) {
        if self.shown_text != snapshot.display_text() {
            let text = snapshot.display_text();
            self.tray_icon.set_title(Some(text));
            if let Err(err) = self.tray_icon.set_tooltip(Some(text)) {
                log::debug!("Failed to update tray tooltip: {}", err);
            }
            self.display_item.set_text(text);
            self.shown_text = text.to_string();
        }

        let raw = raw_label(snapshot);
        if self.raw_item.text() != raw {
            self.raw_item.set_text(raw);
        }
    }

    /// Drains pending menu clicks.
    pub fn poll_actions(&self) -> Vec<TrayAction> {
        // Process pending GTK events so libappindicator can handle D-Bus
        // registration and menu interactions.
        #[cfg(target_os = "linux")]
        while gtk::events_pending() {
            gtk::main_iteration();
        }

        let mut actions = Vec::new();
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            if event.id == self.refresh_id {
                actions.push(TrayAction::Refresh);
            } else if event.id == self.settings_id {
                actions.push(TrayAction::OpenSettings);
            } else if event.id == self.quit_id {
                actions.push(TrayAction::Quit);
            }
        }
        actions
    }
}

fn raw_label(snapshot: &CountdownSnapshot) -> String {
    format!("{RAW_TEXT_PREFIX}{}", snapshot.raw_text())
}

/// A filled ring with a notch at twelve o'clock, drawn straight into RGBA.
fn countdown_icon_rgba(size: u32) -> Vec<u8> {
    let center = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 / 2.0 - 1.0;
    let inner = outer * 0.55;

    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let distance = (dx * dx + dy * dy).sqrt();
            let in_ring = distance <= outer && distance >= inner;
            let in_hand = dx.abs() <= 1.0 && dy <= 0.0 && distance < inner;

            if in_ring || in_hand {
                rgba.extend_from_slice(&[0xF2, 0xF2, 0xF2, 0xFF]);
            } else {
                rgba.extend_from_slice(&[0, 0, 0, 0]);
            }
        }
    }
    rgba
}
