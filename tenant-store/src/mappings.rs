//! User resource mappings.
//!
//! Mappings are keyed by `resource ‖ user`, so the mappings of one
//! resource are a prefix scan of the primary bucket; the by-user index
//! gives the same for one user.

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::schema::{UrmKey, URM_BY_USER};
use crate::Store;
use tenant_kv::Tx;
use tenant_types::{FindOptions, Id, UrmFilter, UserResourceMapping};

impl Store {
    /// Stores a new mapping. A second mapping for the same resource and
    /// user is rejected.
    pub fn create_urm(&self, tx: &Tx<'_>, urm: &UserResourceMapping) -> StoreResult<()> {
        if !urm.resource_id.is_valid() || !urm.user_id.is_valid() {
            return Err(StoreError::InvalidKey {
                kind: UserResourceMapping::KIND,
            });
        }
        self.urms.create(tx, urm)
    }

    pub fn get_urm(
        &self,
        tx: &Tx<'_>,
        resource_id: Id,
        user_id: Id,
    ) -> StoreResult<UserResourceMapping> {
        self.urms.get(
            tx,
            &UrmKey {
                resource_id,
                user_id,
            },
        )
    }

    /// Mappings passing `filter`. A resource id selects that resource's
    /// mappings in user order; otherwise a user id selects that user's
    /// mappings in resource order; otherwise every mapping is scanned.
    pub fn list_urms(
        &self,
        tx: &Tx<'_>,
        filter: UrmFilter,
        opts: &FindOptions,
    ) -> StoreResult<Vec<UserResourceMapping>> {
        let matches = |urm: &UserResourceMapping| filter.matches(urm);
        match (filter.resource_id, filter.user_id) {
            (Some(resource_id), _) => {
                self.urms
                    .list_prefix(tx, &resource_id.encode(), opts, matches)
            }
            (None, Some(user_id)) => self.urms.list_index_prefix(
                tx,
                &URM_BY_USER,
                &user_id.encode(),
                opts,
                matches,
            ),
            (None, None) => self.urms.list_prefix(tx, &[], opts, matches),
        }
    }

    pub fn delete_urm(&self, tx: &Tx<'_>, resource_id: Id, user_id: Id) -> StoreResult<()> {
        self.urms
            .delete(
                tx,
                &UrmKey {
                    resource_id,
                    user_id,
                },
            )
            .map(|_| ())
    }
}
