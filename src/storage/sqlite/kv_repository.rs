use rusqlite::OptionalExtension;

use crate::errors::FeedwatchResult;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::KeyValueStore;

pub struct SqliteKeyValueRepository {
    storage: SqliteStorage,
}

impl SqliteKeyValueRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

impl KeyValueStore for SqliteKeyValueRepository {
    fn get_raw(&self, key: &str) -> FeedwatchResult<Option<String>> {
        let conn = self.storage.connection()?;
        let value = conn
            .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_raw(&self, key: &str, value: &str) -> FeedwatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            (key, value),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> FeedwatchResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
        Ok(())
    }
}
