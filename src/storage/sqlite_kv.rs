use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::kv::KeyValueStore;
use crate::error::Result;

pub const DB_NAME: &str = "notiz-proto-db";
pub const STORE_NAME: &str = "kv";

/// Key-value store in a single SQLite table
pub struct SqliteKvStore {
    conn: Connection,
    path: PathBuf,
}

impl SqliteKvStore {
    /// Open or create the database inside `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{DB_NAME}.sqlite"));
        let conn = Connection::open(&path)?;

        let store = Self { conn, path };
        store.init_schema()?;
        Ok(store)
    }

    /// Open a throwaway in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {STORE_NAME} (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                )"
            ),
            [],
        )?;
        Ok(())
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn put(&self, value: &str, key: &str) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {STORE_NAME} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value"
            ),
            params![key, value],
        )?;
        Ok(())
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                &format!("SELECT value FROM {STORE_NAME} WHERE key = ?1"),
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.put(value, key)
    }
}
