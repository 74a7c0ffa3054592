//! Error types for the entity store.

use tenant_kv::KvError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key or indexed value does not resolve to a live record.
    #[error("{kind} not found")]
    NotFound { kind: &'static str },

    /// Another live record already holds this indexed value.
    #[error("{kind} with {field} {value} already exists")]
    DuplicateIndexedValue {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    /// A record with this key already exists.
    #[error("{kind} with id {key} already exists")]
    DuplicateIdentifier { kind: &'static str, key: String },

    /// An index entry names a record that is not in the primary bucket.
    #[error("index {index} entry {value:?} points at a missing {kind}")]
    CorruptIndex {
        kind: &'static str,
        index: &'static str,
        value: String,
    },

    /// An update tried to change the record's key.
    #[error("{kind} key cannot be changed by an update")]
    ImmutableKey { kind: &'static str },

    /// The zero id was passed where a real one is required.
    #[error("{kind} id is invalid")]
    InvalidKey { kind: &'static str },

    /// The id generator kept producing ids that are taken or invalid.
    #[error("failed to allocate a {kind} id after {attempts} attempts")]
    IdGenerationExhausted { kind: &'static str, attempts: usize },

    /// Engine failure, propagated unchanged.
    #[error(transparent)]
    Engine(#[from] KvError),

    /// Record encoding/decoding error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether this is a [`StoreError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
