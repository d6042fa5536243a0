//! String key-value persistence.
//!
//! Values are stored as JSON text; callers serialize with serde.

use std::collections::HashMap;

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::PoncikError;

/// A string-keyed store for small JSON blobs.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PoncikError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PoncikError>;

    /// Remove `key`. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<bool, PoncikError>;
}

/// Key-value store backed by the `kv_store` table.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    /// Open the store in the default database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, PoncikError> {
        Ok(Self {
            db: Database::open()?,
        })
    }

    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, PoncikError> {
        self.db
            .connection()
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(|e| PoncikError::Database(format!("Failed to read key {key}: {e}")))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PoncikError> {
        self.db
            .connection()
            .execute(
                r"INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                  ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                 updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .map_err(|e| PoncikError::Database(format!("Failed to write key {key}: {e}")))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, PoncikError> {
        let removed = self
            .db
            .connection()
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| PoncikError::Database(format!("Failed to remove key {key}: {e}")))?;
        Ok(removed > 0)
    }
}

/// In-process store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PoncikError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PoncikError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool, PoncikError> {
        Ok(self.entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(store: &mut dyn KeyValueStore) {
        assert_eq!(store.get("missing").unwrap(), None);

        store.set("theme", "\"sakura\"").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"sakura\""));

        store.set("theme", "\"ocean\"").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("\"ocean\""));

        assert!(store.remove("theme").unwrap());
        assert!(!store.remove("theme").unwrap());
        assert_eq!(store.get("theme").unwrap(), None);
    }

    #[test]
    fn test_sqlite_store() {
        let mut store = SqliteStore::with_database(Database::open_in_memory().unwrap());
        exercise(&mut store);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        exercise(&mut store);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("kv.db");

        {
            let mut store = SqliteStore::with_database(Database::open_at(&path).unwrap());
            store.set("bonus_tracker", "{}").unwrap();
        }

        let store = SqliteStore::with_database(Database::open_at(&path).unwrap());
        assert_eq!(store.get("bonus_tracker").unwrap().as_deref(), Some("{}"));
    }
}
