//! Bucket layout of the tenant store.
//!
//! | bucket | key | value |
//! |---|---|---|
//! | `usersv1` | user id | user JSON |
//! | `userindexv1` | user name | user id |
//! | `userspasswordv1` | user id | password hash |
//! | `organizationsv1` | org id | organization JSON |
//! | `organizationindexv1` | org name | org id |
//! | `bucketsv1` | bucket id | bucket JSON |
//! | `bucketindexv1` | org id ‖ bucket name | bucket id |
//! | `userresourcemappingsv1` | resource id ‖ user id | mapping JSON |
//! | `userresourcemappingsbyuserindexv1` | user id ‖ resource id | resource id ‖ user id |

use crate::entity::{Entity, EntityKey, Index};
use std::fmt;
use tenant_types::{Bucket, Id, Organization, User, UserResourceMapping, ID_ENCODED_LEN};

pub const USER_BUCKET: &str = "usersv1";
pub const USER_INDEX: &str = "userindexv1";
pub const USER_PASSWORD_BUCKET: &str = "userspasswordv1";
pub const ORGANIZATION_BUCKET: &str = "organizationsv1";
pub const ORGANIZATION_INDEX: &str = "organizationindexv1";
pub const BUCKET_BUCKET: &str = "bucketsv1";
pub const BUCKET_INDEX: &str = "bucketindexv1";
pub const URM_BUCKET: &str = "userresourcemappingsv1";
pub const URM_BY_USER_INDEX: &str = "userresourcemappingsbyuserindexv1";

/// Every bucket the tenant store reads or writes.
pub const ALL_BUCKETS: &[&str] = &[
    USER_BUCKET,
    USER_INDEX,
    USER_PASSWORD_BUCKET,
    ORGANIZATION_BUCKET,
    ORGANIZATION_INDEX,
    BUCKET_BUCKET,
    BUCKET_INDEX,
    URM_BUCKET,
    URM_BY_USER_INDEX,
];

pub const USER_NAME_INDEX: Index<User> =
    Index::new(USER_INDEX, "name", user_name_key, user_name_label);

pub const ORGANIZATION_NAME_INDEX: Index<Organization> =
    Index::new(ORGANIZATION_INDEX, "name", org_name_key, org_name_label);

pub const BUCKET_NAME_INDEX: Index<Bucket> =
    Index::new(BUCKET_INDEX, "name", bucket_name_key, bucket_name_label);

pub const URM_BY_USER: Index<UserResourceMapping> =
    Index::new(URM_BY_USER_INDEX, "user", urm_by_user_key, urm_by_user_label);

impl Entity for User {
    const KIND: &'static str = "user";
    type Key = Id;

    fn key(&self) -> Id {
        self.id
    }
}

impl Entity for Organization {
    const KIND: &'static str = "organization";
    type Key = Id;

    fn key(&self) -> Id {
        self.id
    }
}

impl Entity for Bucket {
    const KIND: &'static str = "bucket";
    type Key = Id;

    fn key(&self) -> Id {
        self.id
    }
}

impl Entity for UserResourceMapping {
    const KIND: &'static str = "user resource mapping";
    type Key = UrmKey;

    fn key(&self) -> UrmKey {
        UrmKey {
            resource_id: self.resource_id,
            user_id: self.user_id,
        }
    }
}

/// Primary key of a [`UserResourceMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UrmKey {
    pub resource_id: Id,
    pub user_id: Id,
}

impl EntityKey for UrmKey {
    fn to_bytes(&self) -> Vec<u8> {
        concat_ids(self.resource_id, self.user_id)
    }
}

impl fmt::Display for UrmKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_id, self.user_id)
    }
}

/// Index key of a bucket: its organization followed by its name.
pub fn bucket_index_key(org_id: Id, name: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(ID_ENCODED_LEN + name.len());
    key.extend_from_slice(&org_id.encode());
    key.extend_from_slice(name.as_bytes());
    key
}

fn concat_ids(first: Id, second: Id) -> Vec<u8> {
    let mut key = Vec::with_capacity(2 * ID_ENCODED_LEN);
    key.extend_from_slice(&first.encode());
    key.extend_from_slice(&second.encode());
    key
}

fn user_name_key(user: &User) -> Vec<u8> {
    user.name.as_bytes().to_vec()
}

fn user_name_label(user: &User) -> String {
    user.name.clone()
}

fn org_name_key(org: &Organization) -> Vec<u8> {
    org.name.as_bytes().to_vec()
}

fn org_name_label(org: &Organization) -> String {
    org.name.clone()
}

fn bucket_name_key(bucket: &Bucket) -> Vec<u8> {
    bucket_index_key(bucket.org_id, &bucket.name)
}

fn bucket_name_label(bucket: &Bucket) -> String {
    bucket.name.clone()
}

fn urm_by_user_key(urm: &UserResourceMapping) -> Vec<u8> {
    concat_ids(urm.user_id, urm.resource_id)
}

fn urm_by_user_label(urm: &UserResourceMapping) -> String {
    format!("{}/{}", urm.user_id, urm.resource_id)
}
