//! Buckets: named data containers owned by an organization.

use crate::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who owns a bucket's lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketType {
    #[default]
    User,
    System,
}

/// A named data container owned by one organization.
///
/// Names are unique within an organization; two organizations may each
/// own a bucket with the same name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: Id,
    pub org_id: Id,
    #[serde(default)]
    pub bucket_type: BucketType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_policy_name: Option<String>,
    /// Zero keeps data forever. Stored as nanoseconds.
    #[serde(default, with = "duration_nanos")]
    pub retention_period: Duration,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

impl Bucket {
    pub fn new(id: impl Into<Id>, org_id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            org_id: org_id.into(),
            bucket_type: BucketType::User,
            name: name.into(),
            description: String::new(),
            retention_policy_name: None,
            retention_period: Duration::ZERO,
            created_at: DateTime::<Utc>::default(),
            updated_at: DateTime::<Utc>::default(),
        }
    }
}

/// Sparse patch for a [`Bucket`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "duration_nanos::option"
    )]
    pub retention_period: Option<Duration>,
}

impl BucketUpdate {
    pub fn apply(self, bucket: &mut Bucket) {
        if let Some(name) = self.name {
            bucket.name = name;
        }
        if let Some(description) = self.description {
            bucket.description = description;
        }
        if let Some(period) = self.retention_period {
            bucket.retention_period = period;
        }
    }
}

/// Narrows a bucket listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketFilter {
    /// Only buckets owned by this organization, in name order.
    pub org_id: Option<Id>,
}

mod duration_nanos {
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = u64::try_from(d.as_nanos())
            .map_err(|_| S::Error::custom(format!("duration {d:?} overflows u64 nanoseconds")))?;
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_nanos(u64::deserialize(deserializer)?))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S: Serializer>(
            d: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match d {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_nanos))
        }
    }
}
