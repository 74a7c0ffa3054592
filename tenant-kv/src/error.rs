//! Error types for the key-value engine.

use thiserror::Error;

/// Result type for engine operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur in engine operations.
#[derive(Debug, Error)]
pub enum KvError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The bucket was never created.
    #[error("bucket not found: {0}")]
    BucketNotFound(String),

    /// Bucket names are limited to ASCII alphanumerics, `_` and `-`.
    #[error("invalid bucket name: {0:?}")]
    InvalidBucketName(String),

    /// A write was attempted inside a read-only transaction.
    #[error("transaction not writable")]
    TxNotWritable,

    /// A previous transaction panicked while holding the connection.
    #[error("connection lock poisoned")]
    Poisoned,

    /// IO error (file system).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
