//! Organization records.

use crate::error::StoreResult;
use crate::schema::ORGANIZATION_NAME_INDEX;
use crate::Store;
use tenant_kv::Tx;
use tenant_types::{FindOptions, Id, Organization, OrganizationUpdate};

impl Store {
    /// Stores a new organization, stamping both timestamps. An invalid
    /// id is replaced by a generated one.
    pub fn create_org(&self, tx: &Tx<'_>, mut org: Organization) -> StoreResult<Organization> {
        org.id = self.assign_id(tx, &self.orgs, org.id)?;
        let now = self.now();
        org.created_at = now;
        org.updated_at = now;
        self.orgs.create(tx, &org)?;
        Ok(org)
    }

    pub fn get_org(&self, tx: &Tx<'_>, id: Id) -> StoreResult<Organization> {
        self.orgs.get(tx, &id)
    }

    pub fn get_org_by_name(&self, tx: &Tx<'_>, name: &str) -> StoreResult<Organization> {
        self.orgs
            .get_by_index(tx, &ORGANIZATION_NAME_INDEX, name.as_bytes())
    }

    pub fn list_orgs(&self, tx: &Tx<'_>, opts: &FindOptions) -> StoreResult<Vec<Organization>> {
        self.orgs.list(tx, opts)
    }

    pub fn update_org(
        &self,
        tx: &Tx<'_>,
        id: Id,
        upd: OrganizationUpdate,
    ) -> StoreResult<Organization> {
        let now = self.now();
        self.orgs.update(tx, &id, |org| {
            upd.apply(org);
            org.updated_at = now;
        })
    }

    /// Removes the organization. Its buckets and mappings are left in
    /// place.
    pub fn delete_org(&self, tx: &Tx<'_>, id: Id) -> StoreResult<()> {
        self.orgs.delete(tx, &id).map(|_| ())
    }
}
