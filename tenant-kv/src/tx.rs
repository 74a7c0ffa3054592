//! Transactions and bucket handles.

use crate::error::{KvError, KvResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::ops::ControlFlow;

const TABLE_PREFIX: &str = "kv_";
const MAX_BUCKET_NAME_LEN: usize = 128;

/// An open transaction. Read-only ("view") transactions reject writes.
pub struct Tx<'conn> {
    inner: Transaction<'conn>,
    writable: bool,
}

impl<'conn> Tx<'conn> {
    pub(crate) fn begin(conn: &'conn mut Connection, writable: bool) -> KvResult<Self> {
        let behavior = if writable {
            TransactionBehavior::Immediate
        } else {
            TransactionBehavior::Deferred
        };
        let inner = conn.transaction_with_behavior(behavior)?;
        Ok(Self { inner, writable })
    }

    pub(crate) fn commit(self) -> KvResult<()> {
        self.inner.commit()?;
        Ok(())
    }

    pub(crate) fn rollback(self) -> KvResult<()> {
        self.inner.rollback()?;
        Ok(())
    }

    /// Whether this transaction may write.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Opens a bucket created earlier with
    /// [`KvStore::create_bucket`](crate::KvStore::create_bucket).
    pub fn bucket(&self, name: &str) -> KvResult<Bucket<'_>> {
        let table = table_name(name)?;
        if !table_exists(&self.inner, &table)? {
            return Err(KvError::BucketNotFound(name.to_string()));
        }
        Ok(Bucket {
            conn: &self.inner,
            name: name.to_string(),
            table,
            writable: self.writable,
        })
    }
}

/// A handle on one bucket, valid for the life of its transaction.
pub struct Bucket<'tx> {
    conn: &'tx Connection,
    name: String,
    table: String,
    writable: bool,
}

impl Bucket<'_> {
    /// The bucket's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> KvResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                &format!("SELECT value FROM \"{}\" WHERE key = ?1", self.table),
                params![key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &[u8]) -> KvResult<bool> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT 1 FROM \"{}\" WHERE key = ?1", self.table),
                params![key],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&self, key: &[u8], value: &[u8]) -> KvResult<()> {
        self.ensure_writable()?;
        self.conn.execute(
            &format!(
                "INSERT OR REPLACE INTO \"{}\" (key, value) VALUES (?1, ?2)",
                self.table
            ),
            params![key, value],
        )?;
        Ok(())
    }

    /// Removes `key`. Returns whether it was present.
    pub fn delete(&self, key: &[u8]) -> KvResult<bool> {
        self.ensure_writable()?;
        let removed = self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE key = ?1", self.table),
            params![key],
        )?;
        Ok(removed > 0)
    }

    /// Visits entries in ascending key order until the visitor breaks or
    /// the range is exhausted.
    pub fn scan<E, F>(&self, opts: ScanOptions<'_>, mut visit: F) -> Result<(), E>
    where
        E: From<KvError>,
        F: FnMut(&[u8], &[u8]) -> Result<ControlFlow<()>, E>,
    {
        let lower = opts.lower_bound();
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT key, value FROM \"{}\" WHERE key >= ?1 ORDER BY key ASC",
                self.table
            ))
            .map_err(KvError::from)?;
        let mut rows = stmt.query(params![lower]).map_err(KvError::from)?;

        while let Some(row) = rows.next().map_err(KvError::from)? {
            let key: Vec<u8> = row.get(0).map_err(KvError::from)?;
            if let Some(prefix) = opts.prefix {
                if !key.starts_with(prefix) {
                    break;
                }
            }
            let value: Vec<u8> = row.get(1).map_err(KvError::from)?;
            if visit(&key, &value)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    fn ensure_writable(&self) -> KvResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(KvError::TxNotWritable)
        }
    }
}

/// Range of a forward [`Bucket::scan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions<'a> {
    /// Only keys starting with these bytes.
    pub prefix: Option<&'a [u8]>,
    /// First key to visit (inclusive).
    pub start: Option<&'a [u8]>,
}

impl<'a> ScanOptions<'a> {
    /// Every key in the bucket.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            prefix: None,
            start: None,
        }
    }

    /// Keys starting with `prefix`.
    #[must_use]
    pub const fn prefix(prefix: &'a [u8]) -> Self {
        Self {
            prefix: Some(prefix),
            start: None,
        }
    }

    /// Returns a copy starting at `start`.
    #[must_use]
    pub const fn start(mut self, start: &'a [u8]) -> Self {
        self.start = Some(start);
        self
    }

    fn lower_bound(&self) -> &'a [u8] {
        match (self.prefix, self.start) {
            (Some(prefix), Some(start)) => prefix.max(start),
            (Some(bound), None) | (None, Some(bound)) => bound,
            (None, None) => &[],
        }
    }
}

pub(crate) fn table_name(bucket: &str) -> KvResult<String> {
    let valid = !bucket.is_empty()
        && bucket.len() <= MAX_BUCKET_NAME_LEN
        && bucket
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
    if !valid {
        return Err(KvError::InvalidBucketName(bucket.to_string()));
    }
    Ok(format!("{TABLE_PREFIX}{bucket}"))
}

pub(crate) fn table_exists(conn: &Connection, table: &str) -> KvResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |_| Ok(()),
        )
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn bucket_names(conn: &Connection) -> KvResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'kv\\_%' ESCAPE '\\' ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut names = Vec::new();
    for row in rows {
        let table = row?;
        if let Some(name) = table.strip_prefix(TABLE_PREFIX) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
