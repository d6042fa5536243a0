//! `SQLite` database connection and operations.
//!
//! The database is stored at `~/.poncik/poncik.db` and contains tables for:
//! - Settlements queued after a failed end-session call
//! - Key-value state for the shop and bonus tracker

use std::path::Path;

use rusqlite::Connection;

use crate::config::Paths;
use crate::error::PoncikError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open() -> Result<Self, PoncikError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, PoncikError> {
        let conn = Connection::open(path).map_err(|e| {
            PoncikError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::from_connection(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, PoncikError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            PoncikError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, PoncikError> {
        // Concurrent CLI invocations share the file
        conn.busy_timeout(std::time::Duration::from_secs(2))
            .map_err(|e| PoncikError::Database(format!("Failed to set busy timeout: {e}")))?;

        let db = Self { conn };
        migrations::run(&db.conn)?;
        Ok(db)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, PoncikError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Execute a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn execute(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<usize, PoncikError> {
        self.conn
            .execute(sql, params)
            .map_err(|e| PoncikError::Database(format!("Query failed: {e}")))
    }
}
