use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::models::settings::{
    DEFAULT_FETCH_SECONDS, DEFAULT_FETCH_URL, KEY_ENABLE_NOTIFICATION, KEY_FETCH_SECONDS,
    KEY_FETCH_URL, KEY_LAUNCH_AT_LOGIN,
};

const DEFAULT_VALUES: [(&str, &str); 4] = [
    (KEY_FETCH_URL, DEFAULT_FETCH_URL),
    (KEY_FETCH_SECONDS, DEFAULT_FETCH_SECONDS),
    (KEY_ENABLE_NOTIFICATION, "false"),
    (KEY_LAUNCH_AT_LOGIN, "false"),
];

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_settings_table(conn)?;
    insert_default_settings(conn)?;
    Ok(())
}

fn create_settings_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )
    .context("Failed to create settings table")?;

    Ok(())
}

fn insert_default_settings(conn: &Connection) -> Result<()> {
    for (key, value) in DEFAULT_VALUES {
        conn.execute(
            "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .with_context(|| format!("Failed to insert default setting {}", key))?;
    }

    Ok(())
}
