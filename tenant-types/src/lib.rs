//! Core type definitions for the tenant entity store.
//!
//! This crate defines the records persisted by `tenant-store` and the
//! small value types shared by every layer:
//! - [`Id`], the 64-bit identifier with an order-preserving key encoding
//! - the four tenant record kinds: [`User`], [`Organization`], [`Bucket`]
//!   and [`UserResourceMapping`]
//! - sparse update descriptors ([`UserUpdate`], [`OrganizationUpdate`],
//!   [`BucketUpdate`])
//! - [`FindOptions`] pagination
//!
//! Nothing in here touches storage; records are plain serde values.

mod bucket;
mod ids;
mod options;
mod organization;
mod urm;
mod user;

pub use bucket::{Bucket, BucketFilter, BucketType, BucketUpdate};
pub use ids::{Id, ID_ENCODED_LEN};
pub use options::FindOptions;
pub use organization::{Organization, OrganizationUpdate};
pub use urm::{MappingType, ResourceType, UrmFilter, UserResourceMapping, UserType};
pub use user::{Status, User, UserUpdate};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid id: {0}")]
    InvalidId(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),
}
