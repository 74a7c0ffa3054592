//! The engine handle: opening, bucket creation and transactions.

use crate::config::KvConfig;
use crate::error::{KvError, KvResult};
use crate::tx::{self, Tx};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

/// Durable, ordered key-value storage organized into named buckets.
///
/// Each bucket is a SQLite table of `(key BLOB PRIMARY KEY, value BLOB)`,
/// so keys compare byte-wise. All transactions are serialized through one
/// connection.
pub struct KvStore {
    conn: Mutex<Connection>,
}

impl KvStore {
    /// Opens (or creates) a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> KvResult<Self> {
        Self::open_with_config(&KvConfig::at(path))
    }

    /// Opens a private in-memory store (for testing).
    pub fn open_in_memory() -> KvResult<Self> {
        Self::open_with_config(&KvConfig::in_memory())
    }

    pub fn open_with_config(config: &KvConfig) -> KvResult<Self> {
        let conn = match &config.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                let conn = Connection::open(path)?;
                if config.wal {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    debug!(path = %path.display(), journal_mode = %mode, "opened kv store");
                } else {
                    debug!(path = %path.display(), "opened kv store");
                }
                conn
            }
            None => {
                debug!("opened in-memory kv store");
                Connection::open_in_memory()?
            }
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a bucket. Creating an existing bucket is a no-op.
    pub fn create_bucket(&self, name: &str) -> KvResult<()> {
        let table = tx::table_name(name)?;
        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (
                key BLOB PRIMARY KEY NOT NULL,
                value BLOB NOT NULL
            ) WITHOUT ROWID;"
        ))?;
        debug!(bucket = name, "created bucket");
        Ok(())
    }

    /// Whether a bucket with this name exists.
    pub fn has_bucket(&self, name: &str) -> KvResult<bool> {
        let table = tx::table_name(name)?;
        let conn = self.lock()?;
        tx::table_exists(&conn, &table)
    }

    /// Names of all buckets, sorted.
    pub fn bucket_names(&self) -> KvResult<Vec<String>> {
        let conn = self.lock()?;
        tx::bucket_names(&conn)
    }

    /// Runs `f` in a read-only transaction. Nothing is committed.
    pub fn view<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<KvError>,
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
    {
        let mut conn = self.lock()?;
        let tx = Tx::begin(&mut conn, false)?;
        let out = f(&tx);
        if let Err(e) = tx.rollback() {
            warn!(error = %e, "failed to close view transaction");
        }
        out
    }

    /// Runs `f` in a read-write transaction, committing if it returns
    /// `Ok` and rolling back otherwise.
    pub fn update<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<KvError>,
        F: FnOnce(&Tx<'_>) -> Result<T, E>,
    {
        let mut conn = self.lock()?;
        let tx = Tx::begin(&mut conn, true)?;
        match f(&tx) {
            Ok(out) => {
                tx.commit()?;
                Ok(out)
            }
            Err(e) => {
                debug!("rolling back update transaction");
                if let Err(rollback_err) = tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }

    fn lock(&self) -> KvResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| KvError::Poisoned)
    }
}
