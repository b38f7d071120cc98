use std::path::PathBuf;

use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::warn;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{HistoryItem, OptimizationResult};

/// Storage slot holding the entire history as one JSON-encoded array,
/// newest first. A schema change requires rewriting the data under the
/// same key; there is no versioned migration.
const HISTORY_KEY: &str = "promptcraft_history_v1";

/// Local history store backed by a single key-value slot.
///
/// Every operation is a full-collection read-modify-write of the slot.
/// This store is the only access path to the persisted data.
pub struct HistoryStore {
    conn: Connection,
}

impl HistoryStore {
    pub fn new() -> Result<Self, StoreError> {
        let db_path = Self::db_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&db_path).map_err(|source| StoreError::Open {
            path: db_path,
            source,
        })?;
        Self::open(conn)
    }

    pub fn with_path(path: &PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.clone(),
            source,
        })?;
        Self::open(conn)
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::open(Connection::open_in_memory()?)
    }

    pub fn db_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or(StoreError::NoDataDir)?;
        Ok(data_dir.join("promptcraft").join("promptcraft.db"))
    }

    fn open(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }

    /// Returns all history items, newest first, in persisted order.
    ///
    /// An empty, unreadable, or corrupt slot degrades to an empty list;
    /// the cause is logged rather than surfaced.
    pub fn list(&self) -> Vec<HistoryItem> {
        let raw: Option<String> = match self.conn.query_row(
            "SELECT value FROM storage WHERE key = ?1",
            params![HISTORY_KEY],
            |row| row.get(0),
        ) {
            Ok(value) => Some(value),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!(error = %e, "failed to read history slot, treating as empty");
                None
            }
        };

        match raw {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!(error = %e, "history slot is corrupt, treating as empty");
                Vec::new()
            }),
            None => Vec::new(),
        }
    }

    /// Persists a new item at the head of the history and returns it.
    pub fn append(&self, result: OptimizationResult) -> Result<HistoryItem, StoreError> {
        let mut history = self.list();
        let item = HistoryItem {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            is_bookmarked: false,
            original_prompt: result.original_prompt,
            category: result.category,
            optimized_prompt: result.optimized_prompt,
            analysis_notes: result.analysis_notes,
            improvements: result.improvements,
            rating: result.rating,
        };
        history.insert(0, item.clone());
        self.write_slot(&history)?;
        Ok(item)
    }

    /// Flips the bookmark flag on the matching item (no-op when the id
    /// is unknown) and returns the full updated history.
    pub fn toggle_bookmark(&self, id: &str) -> Result<Vec<HistoryItem>, StoreError> {
        let mut history = self.list();
        if let Some(item) = history.iter_mut().find(|item| item.id == id) {
            item.is_bookmarked = !item.is_bookmarked;
        }
        self.write_slot(&history)?;
        Ok(history)
    }

    /// Removes the matching item (no-op when the id is unknown) and
    /// returns the remaining history.
    pub fn delete(&self, id: &str) -> Result<Vec<HistoryItem>, StoreError> {
        let mut history = self.list();
        history.retain(|item| item.id != id);
        self.write_slot(&history)?;
        Ok(history)
    }

    /// Removes the entire history slot.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.conn
            .execute("DELETE FROM storage WHERE key = ?1", params![HISTORY_KEY])?;
        Ok(())
    }

    fn write_slot(&self, history: &[HistoryItem]) -> Result<(), StoreError> {
        let json = serde_json::to_string(history)?;
        self.conn.execute(
            "INSERT INTO storage (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![HISTORY_KEY, json],
        )?;
        Ok(())
    }
}
