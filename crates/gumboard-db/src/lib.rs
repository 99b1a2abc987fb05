pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
pub use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

/// Single SQLite connection shared by all handlers.
///
/// Writes that touch several rows go through [`Database::transaction`] so they
/// either land together or not at all.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Like [`Database::with_conn`] but for callers with their own error type.
    pub fn read<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| E::from(anyhow::anyhow!("DB lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Run `f` inside a transaction. Commits when `f` returns `Ok`, rolls
    /// back otherwise.
    pub fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Transaction<'_>) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| E::from(anyhow::anyhow!("DB lock poisoned: {}", e)))?;
        let tx = conn.transaction().map_err(|e| E::from(anyhow::Error::from(e)))?;
        let out = f(&tx)?;
        tx.commit().map_err(|e| E::from(anyhow::Error::from(e)))?;
        Ok(out)
    }
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// `?1, ?2, ...` placeholders for an `IN (...)` list, starting after `offset`
/// already-bound parameters.
pub(crate) fn placeholders(count: usize, offset: usize) -> String {
    (offset + 1..=offset + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}
