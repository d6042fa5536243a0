//! Database migrations for poncik.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::PoncikError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, PoncikError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| PoncikError::Database(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), PoncikError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| PoncikError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), PoncikError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), PoncikError> {
    match version {
        1 => migrate_v1(conn),
        _ => Err(PoncikError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: Initial schema.
///
/// Creates tables for:
/// - `pending_settlements`: end-session calls that failed and were queued
/// - `kv_store`: JSON blobs keyed by name
fn migrate_v1(conn: &Connection) -> Result<(), PoncikError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS pending_settlements (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            mode TEXT NOT NULL,
            elapsed_minutes INTEGER NOT NULL,
            double_credits INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0,
            last_attempt TEXT,
            last_error TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_pending_settlements_created
        ON pending_settlements(created_at);

        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| PoncikError::Database(format!("Migration v1 failed: {e}")))
}
