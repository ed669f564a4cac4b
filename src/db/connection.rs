use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, TransactionBehavior};

use crate::db::schema::MIGRATIONS;
use crate::error::{DocmineError, Result};

/// How long a connection waits on another worker's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

/// A single connection to the docmine store.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) a database at the given path and apply pending migrations.
    pub fn open(path: &Path) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(
            "PRAGMA journal_mode=WAL;\
             PRAGMA foreign_keys=ON;\
             PRAGMA synchronous=NORMAL;",
        )?;
        Self::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Create an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// Apply every migration newer than the stored `user_version`.
    ///
    /// Each step takes the write lock up front and re-reads the version, so
    /// workers opening a fresh store at the same time apply every step once.
    fn migrate(conn: &mut Connection) -> Result<()> {
        let current: u32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
        for (idx, step) in MIGRATIONS.iter().enumerate().skip(current as usize) {
            let version = idx as u32 + 1;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let applied: u32 = tx.query_row("PRAGMA user_version", [], |r| r.get(0))?;
            if applied >= version {
                continue;
            }
            tx.execute_batch(step)
                .map_err(|e| DocmineError::Migration {
                    version,
                    detail: e.to_string(),
                })?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()?;
            tracing::debug!("applied schema migration {version}");
        }
        Ok(())
    }

    /// Current schema version.
    pub fn schema_version(&self) -> Result<u32> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version", [], |r| r.get(0))?)
    }

    /// Access the underlying connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Access the underlying connection mutably.
    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

/// Handle to the on-disk store, shared by all workers.
///
/// Each operation opens its own connection and closes it when the returned
/// [`Database`] is dropped; concurrent writers serialize on `SQLite`'s lock.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a fresh connection, creating and migrating the database if needed.
    pub fn open(&self) -> Result<Database> {
        Database::open(&self.path)
    }
}
