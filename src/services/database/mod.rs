// Database service module
// SQLite connection backing the key/value settings store

mod schema;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use rusqlite::Connection;

/// Overrides the settings database location when set.
pub const DATABASE_PATH_ENV: &str = "MENUBAR_COUNTDOWN_DB";

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database connection
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file (or ":memory:" for in-memory)
    ///
    /// # Examples
    /// ```
    /// use menubar_countdown::services::database::Database;
    /// let db = Database::new(":memory:").unwrap();
    /// ```
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path))?;

        Ok(Self { conn })
    }

    /// Opens a database file, creating its parent directory first.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create dir {}", parent.display()))?;
            }
        }

        let path_str = path
            .to_str()
            .with_context(|| format!("Database path is not valid UTF-8: {}", path.display()))?;
        Self::new(path_str)
    }

    /// Initialize the database schema
    /// Creates the settings table and seeds defaults for missing keys
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(&self.conn)
    }

    /// Get a reference to the database connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Resolves where the settings database lives.
///
/// `MENUBAR_COUNTDOWN_DB` wins, then the per-user data directory, then the
/// working directory.
pub fn resolve_database_path() -> PathBuf {
    if let Some(path) = std::env::var_os(DATABASE_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(dirs) = ProjectDirs::from("com", "Ken24T", "MenuBarCountdown") {
        dirs.data_dir().join("settings.db")
    } else {
        log::warn!("Unable to resolve project directory; using current dir for settings");
        PathBuf::from("settings.db")
    }
}
