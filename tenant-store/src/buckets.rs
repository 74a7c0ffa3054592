//! Buckets, named uniquely within their organization.

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::schema::{bucket_index_key, BUCKET_NAME_INDEX};
use crate::Store;
use tenant_kv::Tx;
use tenant_types::{Bucket, BucketFilter, BucketUpdate, FindOptions, Id, Organization};

impl Store {
    /// Stores a new bucket in an existing organization, stamping both
    /// timestamps. Names are unique per organization.
    pub fn create_bucket(&self, tx: &Tx<'_>, mut bucket: Bucket) -> StoreResult<Bucket> {
        if !bucket.org_id.is_valid() {
            return Err(StoreError::InvalidKey {
                kind: Organization::KIND,
            });
        }
        if !self.orgs.contains(tx, &bucket.org_id)? {
            return Err(StoreError::NotFound {
                kind: Organization::KIND,
            });
        }
        bucket.id = self.assign_id(tx, &self.buckets, bucket.id)?;
        let now = self.now();
        bucket.created_at = now;
        bucket.updated_at = now;
        self.buckets.create(tx, &bucket)?;
        Ok(bucket)
    }

    pub fn get_bucket(&self, tx: &Tx<'_>, id: Id) -> StoreResult<Bucket> {
        self.buckets.get(tx, &id)
    }

    pub fn get_bucket_by_name(&self, tx: &Tx<'_>, org_id: Id, name: &str) -> StoreResult<Bucket> {
        self.buckets
            .get_by_index(tx, &BUCKET_NAME_INDEX, &bucket_index_key(org_id, name))
    }

    /// Without an organization, buckets in ascending id order; with one,
    /// that organization's buckets in name order.
    pub fn list_buckets(
        &self,
        tx: &Tx<'_>,
        filter: BucketFilter,
        opts: &FindOptions,
    ) -> StoreResult<Vec<Bucket>> {
        match filter.org_id {
            Some(org_id) => self.buckets.list_index_prefix(
                tx,
                &BUCKET_NAME_INDEX,
                &org_id.encode(),
                opts,
                |_| true,
            ),
            None => self.buckets.list(tx, opts),
        }
    }

    pub fn update_bucket(&self, tx: &Tx<'_>, id: Id, upd: BucketUpdate) -> StoreResult<Bucket> {
        let now = self.now();
        self.buckets.update(tx, &id, |bucket| {
            upd.apply(bucket);
            bucket.updated_at = now;
        })
    }

    pub fn delete_bucket(&self, tx: &Tx<'_>, id: Id) -> StoreResult<()> {
        self.buckets.delete(tx, &id).map(|_| ())
    }
}
