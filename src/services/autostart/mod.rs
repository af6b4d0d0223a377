// Autostart service module
// Per-user launch-at-login entry for the current platform

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const ENTRY_NAME: &str = "menubar-countdown";

/// Registers or unregisters the app as a login item.
pub trait LoginItemRegistrar: Send {
    fn set_enabled(&self, enabled: bool) -> Result<()>;
}

/// Writes the platform's autostart entry for `executable`.
///
/// - Linux: `$XDG_CONFIG_HOME/autostart/menubar-countdown.desktop`
/// - macOS: `~/Library/LaunchAgents/menubar-countdown.plist`
/// - Windows: `menubar-countdown.cmd` in the user's Startup folder
pub struct AutostartService {
    entry_path: PathBuf,
    executable: PathBuf,
}

impl AutostartService {
    /// Resolves the entry location for the current user and executable.
    pub fn new() -> Result<Self> {
        let base_dirs = directories::BaseDirs::new().context("Failed to get base directories")?;
        let executable =
            std::env::current_exe().context("Failed to resolve the current executable")?;

        Ok(Self::with_paths(default_entry_path(&base_dirs), executable))
    }

    pub fn with_paths(entry_path: PathBuf, executable: PathBuf) -> Self {
        Self {
            entry_path,
            executable,
        }
    }

    pub fn entry_path(&self) -> &Path {
        &self.entry_path
    }

    pub fn is_enabled(&self) -> bool {
        self.entry_path.exists()
    }

    fn enable(&self) -> Result<()> {
        if let Some(parent) = self.entry_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create autostart directory: {:?}", parent))?;
        }

        fs::write(&self.entry_path, entry_contents(&self.executable))
            .with_context(|| format!("Failed to write autostart entry: {:?}", self.entry_path))?;

        log::info!("Launch at login enabled ({:?})", self.entry_path);
        Ok(())
    }

    fn disable(&self) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        fs::remove_file(&self.entry_path)
            .with_context(|| format!("Failed to remove autostart entry: {:?}", self.entry_path))?;

        log::info!("Launch at login disabled");
        Ok(())
    }
}

impl LoginItemRegistrar for AutostartService {
    fn set_enabled(&self, enabled: bool) -> Result<()> {
        if enabled {
            self.enable()
        } else {
            self.disable()
        }
    }
}

#[cfg(target_os = "macos")]
fn default_entry_path(base_dirs: &directories::BaseDirs) -> PathBuf {
    base_dirs
        .home_dir()
        .join("Library")
        .join("LaunchAgents")
        .join(format!("{ENTRY_NAME}.plist"))
}

#[cfg(target_os = "windows")]
fn default_entry_path(base_dirs: &directories::BaseDirs) -> PathBuf {
    base_dirs
        .config_dir()
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("Programs")
        .join("Startup")
        .join(format!("{ENTRY_NAME}.cmd"))
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn default_entry_path(base_dirs: &directories::BaseDirs) -> PathBuf {
    base_dirs
        .config_dir()
        .join("autostart")
        .join(format!("{ENTRY_NAME}.desktop"))
}

#[cfg(target_os = "macos")]
fn entry_contents(executable: &Path) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>Label</key>
    <string>{ENTRY_NAME}</string>
    <key>ProgramArguments</key>
    <array>
        <string>{}</string>
    </array>
    <key>RunAtLoad</key>
    <true/>
</dict>
</plist>
"#,
        executable.display()
    )
}

#[cfg(target_os = "windows")]
fn entry_contents(executable: &Path) -> String {
    format!("@echo off\r\nstart \"\" \"{}\"\r\n", executable.display())
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn entry_contents(executable: &Path) -> String {
    format!(
        "[Desktop Entry]\n\
         Type=Application\n\
         Name=MenuBarCountdown\n\
         Exec=\"{}\"\n\
         X-GNOME-Autostart-enabled=true\n\
         NoDisplay=true\n",
        executable.display()
    )
}
