//! User resource mappings: which user holds which role on a resource.

use crate::Id;
use serde::{Deserialize, Serialize};

/// Role a user holds on a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Owner,
    #[default]
    Member,
}

/// What kind of principal `user_id` refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    #[default]
    User,
    Org,
}

/// The kind of resource a mapping grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Orgs,
    Buckets,
    Users,
    Dashboards,
    Tasks,
}

/// Grants a user a role on a resource.
///
/// A mapping has no id of its own; it is identified by the
/// `(resource_id, user_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResourceMapping {
    pub user_id: Id,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default)]
    pub mapping_type: MappingType,
    pub resource_type: ResourceType,
    pub resource_id: Id,
}

impl UserResourceMapping {
    pub fn new(
        user_id: impl Into<Id>,
        user_type: UserType,
        resource_type: ResourceType,
        resource_id: impl Into<Id>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            user_type,
            mapping_type: MappingType::User,
            resource_type,
            resource_id: resource_id.into(),
        }
    }
}

/// Narrows a mapping listing. When both ids are set the resource
/// listing is used and filtered by user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrmFilter {
    pub resource_id: Option<Id>,
    pub user_id: Option<Id>,
    pub resource_type: Option<ResourceType>,
    pub user_type: Option<UserType>,
}

impl UrmFilter {
    /// Whether `urm` passes the non-key predicates of this filter.
    #[must_use]
    pub fn matches(&self, urm: &UserResourceMapping) -> bool {
        self.resource_id.is_none_or(|id| urm.resource_id == id)
            && self.user_id.is_none_or(|id| urm.user_id == id)
            && self.resource_type.is_none_or(|t| urm.resource_type == t)
            && self.user_type.is_none_or(|t| urm.user_type == t)
    }
}
