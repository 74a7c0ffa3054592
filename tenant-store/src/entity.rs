//! Describes how a record kind maps onto buckets.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use tenant_types::Id;

/// A record kind persisted by an [`IndexedStore`](crate::IndexedStore).
pub trait Entity: Serialize + DeserializeOwned + Clone {
    /// Lowercase kind name used in errors and logs ("user").
    const KIND: &'static str;

    /// Primary key type.
    type Key: EntityKey;

    /// The record's primary key.
    fn key(&self) -> Self::Key;
}

/// A primary key with an order-defining byte encoding.
pub trait EntityKey: fmt::Display {
    fn to_bytes(&self) -> Vec<u8>;
}

impl EntityKey for Id {
    fn to_bytes(&self) -> Vec<u8> {
        self.encode().to_vec()
    }
}

/// A secondary index over one attribute of `E`.
///
/// The index bucket maps the attribute's encoded value to the owning
/// record's encoded key. Each value is held by at most one record.
pub struct Index<E> {
    bucket: &'static str,
    field: &'static str,
    key: fn(&E) -> Vec<u8>,
    label: fn(&E) -> String,
}

impl<E> Index<E> {
    /// `key` encodes the indexed value; `label` renders it for conflict
    /// errors.
    pub const fn new(
        bucket: &'static str,
        field: &'static str,
        key: fn(&E) -> Vec<u8>,
        label: fn(&E) -> String,
    ) -> Self {
        Self {
            bucket,
            field,
            key,
            label,
        }
    }

    pub const fn bucket(&self) -> &'static str {
        self.bucket
    }

    pub const fn field(&self) -> &'static str {
        self.field
    }

    pub fn key_of(&self, entity: &E) -> Vec<u8> {
        (self.key)(entity)
    }

    pub fn label_of(&self, entity: &E) -> String {
        (self.label)(entity)
    }
}

impl<E> Clone for Index<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Index<E> {}

impl<E> fmt::Debug for Index<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Index")
            .field("bucket", &self.bucket)
            .field("field", &self.field)
            .finish()
    }
}
