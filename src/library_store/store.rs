//! SQLite-backed library store.
//!
//! `LibraryStore` owns the single connection used by an import run and hands
//! out the import transaction. Upserts run inside savepoints of that
//! transaction so that one failed entity can be undone without losing the
//! rest of the run.

use super::schema::{LIBRARY_TABLE_NAMES, LIBRARY_VERSIONED_SCHEMAS};
use super::upsert::UpsertError;
use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags, Transaction, TransactionBehavior};
use std::path::Path;
use tracing::{debug, error, info};

/// Row counts per library table, in dependency order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LibraryCounts {
    pub tables: Vec<(&'static str, usize)>,
}

impl LibraryCounts {
    pub fn get(&self, table: &str) -> Option<usize> {
        self.tables
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, count)| *count)
    }
}

pub struct LibraryStore {
    conn: Connection,
}

fn create_or_validate_schema(conn: &Connection) -> Result<()> {
    let latest_version = LIBRARY_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &LIBRARY_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating library db schema at version {}", latest_version);
        let tx = conn.unchecked_transaction()?;
        latest_schema.create(&tx)?;
        tx.commit()?;
        return Ok(());
    }

    latest_schema
        .validate(conn)
        .context("Library database schema does not match")
}

impl LibraryStore {
    /// Opens (creating if needed) the library database at `db_path`.
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open library database {:?}", db_path))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        create_or_validate_schema(&conn)?;
        Ok(LibraryStore { conn })
    }

    /// Starts the transaction wrapping a whole import.
    pub fn begin_import(&mut self) -> rusqlite::Result<ImportTransaction<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        debug!("Import transaction started");
        Ok(ImportTransaction { tx })
    }

    pub fn counts(&self) -> Result<LibraryCounts> {
        let mut tables = Vec::with_capacity(LIBRARY_TABLE_NAMES.len());
        for table in LIBRARY_TABLE_NAMES {
            let count: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| {
                    r.get(0)
                })
                .with_context(|| format!("Failed to count rows of {}", table))?;
            tables.push((*table, count as usize));
        }
        Ok(LibraryCounts { tables })
    }

    /// Releases the connection.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close library database")
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// The single transaction of an import run. Dropping it without calling
/// [`ImportTransaction::commit`] rolls every write back.
pub struct ImportTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl ImportTransaction<'_> {
    /// Runs `op` inside a savepoint. On failure the savepoint is rolled back
    /// before the error is returned, so the transaction holds no partial
    /// writes of the failed entity.
    pub fn scoped<T, F>(&mut self, op: F) -> Result<T, UpsertError>
    where
        F: FnOnce(&Connection) -> Result<T, UpsertError>,
    {
        let savepoint = match self.tx.savepoint() {
            Ok(savepoint) => savepoint,
            Err(e) => return Err(UpsertError::savepoint(e)),
        };
        match op(&savepoint) {
            Ok(value) => {
                savepoint.commit().map_err(UpsertError::savepoint)?;
                Ok(value)
            }
            Err(err) => {
                // Default drop behavior of a savepoint is rollback
                if let Err(e) = savepoint.finish() {
                    error!("{}", err);
                    return Err(UpsertError::savepoint(e));
                }
                Err(err)
            }
        }
    }

    pub fn commit(self) -> rusqlite::Result<()> {
        self.tx.commit()?;
        debug!("Import transaction committed");
        Ok(())
    }

    pub fn rollback(self) -> rusqlite::Result<()> {
        self.tx.rollback()?;
        debug!("Import transaction rolled back");
        Ok(())
    }
}
