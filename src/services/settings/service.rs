use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, OptionalExtension};

use super::SettingsStore;
use crate::services::database::Database;

/// SQLite-backed [`SettingsStore`].
pub struct SettingsService {
    db: Database,
}

impl SettingsService {
    pub fn new(db: Database) -> Result<Self> {
        db.initialize_schema()?;
        Ok(Self { db })
    }

    /// Opens (or creates) the settings database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::open(path)?;
        log::info!("Using settings database at {}", path.display());
        Self::new(db)
    }

    pub fn in_memory() -> Result<Self> {
        Self::new(Database::new(":memory:")?)
    }
}

impl SettingsStore for SettingsService {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .connection()
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to load setting {}", key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db
            .connection()
            .execute(
                "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
                params![key, value],
            )
            .with_context(|| format!("Failed to update setting {}", key))?;
        Ok(())
    }
}
