//! Generic CRUD over one primary bucket and its secondary indexes.
//!
//! Every mutation validates all index claims before its first write, so
//! a rejected create or update leaves the transaction exactly as it was.
//! Atomicity across buckets comes from the enclosing [`Tx`]: an error
//! returned out of `KvStore::update` rolls back every write made here.

use crate::entity::{Entity, EntityKey, Index};
use crate::error::{StoreError, StoreResult};
use std::ops::ControlFlow;
use tenant_kv::{Bucket, ScanOptions, Tx};
use tenant_types::FindOptions;
use tracing::debug;

/// CRUD for one record kind, keeping its indexes consistent.
#[derive(Debug, Clone)]
pub struct IndexedStore<E> {
    bucket: &'static str,
    indexes: Vec<Index<E>>,
}

impl<E: Entity> IndexedStore<E> {
    /// A store over `bucket` with no secondary indexes.
    pub fn new(bucket: &'static str) -> Self {
        Self {
            bucket,
            indexes: Vec::new(),
        }
    }

    /// Adds a secondary index.
    #[must_use]
    pub fn with_index(mut self, index: Index<E>) -> Self {
        self.indexes.push(index);
        self
    }

    /// Primary bucket name.
    pub fn bucket(&self) -> &'static str {
        self.bucket
    }

    pub fn indexes(&self) -> &[Index<E>] {
        &self.indexes
    }

    /// Primary and index bucket names.
    pub fn bucket_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.bucket).chain(self.indexes.iter().map(Index::bucket))
    }

    /// Inserts a new record and one entry per index.
    pub fn create(&self, tx: &Tx<'_>, entity: &E) -> StoreResult<()> {
        let key = entity.key();
        let key_bytes = key.to_bytes();

        let mut entries = Vec::with_capacity(self.indexes.len());
        for index in &self.indexes {
            let bucket = tx.bucket(index.bucket())?;
            let value = index.key_of(entity);
            if let Some(owner) = bucket.get(&value)? {
                if owner != key_bytes {
                    return Err(duplicate::<E>(index, entity));
                }
            }
            entries.push((bucket, value));
        }

        let primary = tx.bucket(self.bucket)?;
        if primary.contains(&key_bytes)? {
            return Err(StoreError::DuplicateIdentifier {
                kind: E::KIND,
                key: key.to_string(),
            });
        }

        primary.put(&key_bytes, &serde_json::to_vec(entity)?)?;
        for (bucket, value) in entries {
            bucket.put(&value, &key_bytes)?;
        }
        debug!(kind = E::KIND, key = %key, "created");
        Ok(())
    }

    /// Returns the record stored under `key`.
    pub fn get(&self, tx: &Tx<'_>, key: &E::Key) -> StoreResult<E> {
        self.find(tx, key)?
            .ok_or(StoreError::NotFound { kind: E::KIND })
    }

    /// Like [`get`](Self::get), but absence is `Ok(None)`.
    pub fn find(&self, tx: &Tx<'_>, key: &E::Key) -> StoreResult<Option<E>> {
        let primary = tx.bucket(self.bucket)?;
        decode_at(&primary, &key.to_bytes())
    }

    /// Whether a record is stored under `key`.
    pub fn contains(&self, tx: &Tx<'_>, key: &E::Key) -> StoreResult<bool> {
        Ok(tx.bucket(self.bucket)?.contains(&key.to_bytes())?)
    }

    /// Resolves an encoded indexed value to its record.
    pub fn get_by_index(&self, tx: &Tx<'_>, index: &Index<E>, value: &[u8]) -> StoreResult<E> {
        let owner = tx
            .bucket(index.bucket())?
            .get(value)?
            .ok_or(StoreError::NotFound { kind: E::KIND })?;
        let primary = tx.bucket(self.bucket)?;
        decode_at(&primary, &owner)?.ok_or_else(|| corrupt::<E>(index, value))
    }

    /// All records in ascending key order, paginated.
    pub fn list(&self, tx: &Tx<'_>, opts: &FindOptions) -> StoreResult<Vec<E>> {
        self.list_prefix(tx, &[], opts, |_| true)
    }

    /// Records whose encoded key starts with `prefix` and that pass
    /// `filter`, in key order. Pagination counts only passing records.
    pub fn list_prefix<F>(
        &self,
        tx: &Tx<'_>,
        prefix: &[u8],
        opts: &FindOptions,
        mut filter: F,
    ) -> StoreResult<Vec<E>>
    where
        F: FnMut(&E) -> bool,
    {
        let mut page = Page::new(opts);
        if page.is_full() {
            return Ok(Vec::new());
        }
        tx.bucket(self.bucket)?
            .scan(ScanOptions::prefix(prefix), |_, raw| {
                let entity: E = serde_json::from_slice(raw)?;
                Ok::<_, StoreError>(page.offer(entity, &mut filter))
            })?;
        Ok(page.into_records())
    }

    /// Records whose value in `index` starts with `prefix`, in index
    /// order, paginated.
    pub fn list_index_prefix<F>(
        &self,
        tx: &Tx<'_>,
        index: &Index<E>,
        prefix: &[u8],
        opts: &FindOptions,
        mut filter: F,
    ) -> StoreResult<Vec<E>>
    where
        F: FnMut(&E) -> bool,
    {
        let mut page = Page::new(opts);
        if page.is_full() {
            return Ok(Vec::new());
        }
        let primary = tx.bucket(self.bucket)?;
        tx.bucket(index.bucket())?
            .scan(ScanOptions::prefix(prefix), |value, owner| {
                let entity = decode_at::<E>(&primary, owner)?
                    .ok_or_else(|| corrupt::<E>(index, value))?;
                Ok::<_, StoreError>(page.offer(entity, &mut filter))
            })?;
        Ok(page.into_records())
    }

    /// Applies `patch` to the stored record, re-pointing every index
    /// whose value changed, and returns the merged record.
    pub fn update<F>(&self, tx: &Tx<'_>, key: &E::Key, patch: F) -> StoreResult<E>
    where
        F: FnOnce(&mut E),
    {
        let key_bytes = key.to_bytes();
        let primary = tx.bucket(self.bucket)?;
        let current: E =
            decode_at(&primary, &key_bytes)?.ok_or(StoreError::NotFound { kind: E::KIND })?;

        let mut merged = current.clone();
        patch(&mut merged);
        if merged.key().to_bytes() != key_bytes {
            return Err(StoreError::ImmutableKey { kind: E::KIND });
        }

        let mut moves = Vec::new();
        for index in &self.indexes {
            let old_value = index.key_of(&current);
            let new_value = index.key_of(&merged);
            if old_value == new_value {
                continue;
            }
            let bucket = tx.bucket(index.bucket())?;
            if let Some(owner) = bucket.get(&new_value)? {
                if owner != key_bytes {
                    return Err(duplicate::<E>(index, &merged));
                }
            }
            moves.push((bucket, old_value, new_value));
        }

        for (bucket, old_value, new_value) in moves {
            bucket.delete(&old_value)?;
            bucket.put(&new_value, &key_bytes)?;
        }
        primary.put(&key_bytes, &serde_json::to_vec(&merged)?)?;
        debug!(kind = E::KIND, key = %key, "updated");
        Ok(merged)
    }

    /// Removes the record and every index entry pointing at it. Returns
    /// the removed record.
    pub fn delete(&self, tx: &Tx<'_>, key: &E::Key) -> StoreResult<E> {
        let key_bytes = key.to_bytes();
        let primary = tx.bucket(self.bucket)?;
        let current: E =
            decode_at(&primary, &key_bytes)?.ok_or(StoreError::NotFound { kind: E::KIND })?;

        for index in &self.indexes {
            let bucket = tx.bucket(index.bucket())?;
            let value = index.key_of(&current);
            if bucket.get(&value)?.as_deref() == Some(key_bytes.as_slice()) {
                bucket.delete(&value)?;
            }
        }
        primary.delete(&key_bytes)?;
        debug!(kind = E::KIND, key = %key, "deleted");
        Ok(current)
    }
}

/// Offset/limit bookkeeping for one listing scan.
struct Page<E> {
    opts: FindOptions,
    skip: usize,
    records: Vec<E>,
}

impl<E> Page<E> {
    fn new(opts: &FindOptions) -> Self {
        Self {
            opts: *opts,
            skip: opts.offset,
            records: Vec::new(),
        }
    }

    fn is_full(&self) -> bool {
        self.opts.is_satisfied(self.records.len())
    }

    fn offer<F>(&mut self, entity: E, filter: &mut F) -> ControlFlow<()>
    where
        F: FnMut(&E) -> bool,
    {
        if !filter(&entity) {
            return ControlFlow::Continue(());
        }
        if self.skip > 0 {
            self.skip -= 1;
            return ControlFlow::Continue(());
        }
        self.records.push(entity);
        if self.is_full() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn into_records(self) -> Vec<E> {
        self.records
    }
}

fn decode_at<E: Entity>(bucket: &Bucket<'_>, key: &[u8]) -> StoreResult<Option<E>> {
    match bucket.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
        None => Ok(None),
    }
}

fn duplicate<E: Entity>(index: &Index<E>, entity: &E) -> StoreError {
    StoreError::DuplicateIndexedValue {
        kind: E::KIND,
        field: index.field(),
        value: index.label_of(entity),
    }
}

fn corrupt<E: Entity>(index: &Index<E>, value: &[u8]) -> StoreError {
    StoreError::CorruptIndex {
        kind: E::KIND,
        index: index.bucket(),
        value: String::from_utf8_lossy(value).into_owned(),
    }
}
