/*!
 * SQLite-backed key/value store.
 *
 * Values survive restarts, which is how the last viewed unit and the preferred
 * playback rate are remembered between runs.
 */

use std::path::{Path, PathBuf};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

use super::schema;
use crate::collaborators::KeyValueStore;
use crate::errors::StoreError;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "readalong.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "readalong";

/// Key/value store persisted in a SQLite database
pub struct SqliteStore {
    /// Path to the database file
    db_path: PathBuf,
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the store at the default location
    pub fn new_default() -> Result<Self, StoreError> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Open (or create) the store at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Open(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }

        info!("Opening preference store at: {:?}", db_path);

        let conn = Connection::open(&db_path)?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        debug!("Creating in-memory preference store");

        let conn = Connection::open_in_memory()?;
        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Mutex::new(conn),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf, StoreError> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| StoreError::Open("Could not determine data directory".to_string()))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Remove a key, returning whether it existed
    pub fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let conn = self.connection.lock();
        let removed = conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.connection.lock();
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let conn = self.connection.lock();
        conn.execute(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }
}
