//! SQLite persistence for ledger state.
//!
//! A small key-value table holding the dismissed-notification-id set as a
//! serialized ordered list of strings. Read once at startup, written on
//! every mutation. WAL mode for concurrent read access.

use rusqlite::{Connection, OptionalExtension, params};
use tracing::warn;

use crate::error::Result;

const DISMISSED_KEY: &str = "dismissed_ids";

/// Storage backend. Owns the SQLite connection.
pub struct LedgerStore {
    conn: Connection,
}

impl LedgerStore {
    /// Open or create a database at the given path.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS ledger_kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Load the persisted dismissed-id list. A missing key or a value that
    /// no longer parses degrades to an empty set rather than failing load.
    pub fn load_dismissed(&self) -> Result<Vec<String>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM ledger_kv WHERE key = ?1",
                params![DISMISSED_KEY],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                warn!("malformed dismissed-id list, starting empty: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Persist the dismissed-id list, replacing any previous value.
    pub fn save_dismissed(&self, ids: &[String]) -> Result<()> {
        let raw = serde_json::to_string(ids)
            .map_err(|e| crate::error::Error::Other(format!("serialize dismissed ids: {e}")))?;
        self.conn.execute(
            "INSERT INTO ledger_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![DISMISSED_KEY, raw],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_dismissed_ids() {
        let store = LedgerStore::in_memory().unwrap();
        assert!(store.load_dismissed().unwrap().is_empty());

        store
            .save_dismissed(&["n1".to_string(), "n2".to_string()])
            .unwrap();
        assert_eq!(store.load_dismissed().unwrap(), vec!["n1", "n2"]);
    }

    #[test]
    fn malformed_value_degrades_to_empty() {
        let store = LedgerStore::in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO ledger_kv (key, value) VALUES (?1, ?2)",
                params![DISMISSED_KEY, "not json {{{"],
            )
            .unwrap();

        assert!(store.load_dismissed().unwrap().is_empty());
    }
}
