//! Transactional entity store for the tenant model.
//!
//! Users, organizations, buckets and user resource mappings are each kept
//! in one primary bucket of a [`tenant_kv::KvStore`], keyed by their
//! encoded key, with secondary index buckets that map a unique attribute
//! (a user's name, a bucket's organization and name, ...) back to the key.
//!
//! # Architecture
//!
//! - [`IndexedStore`] implements create / get / get-by-index / list /
//!   update / delete once, for any [`Entity`] with a list of [`Index`]
//!   descriptors, and keeps primary and index buckets consistent inside
//!   the caller's transaction.
//! - [`Store`] instantiates one `IndexedStore` per record kind and adds
//!   kind-specific behavior: id allocation, timestamps, passwords,
//!   per-organization bucket names, mapping lookups by user or resource.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tenant_kv::KvStore;
//! use tenant_store::Store;
//! use tenant_types::User;
//!
//! let kv = Arc::new(KvStore::open_in_memory()?);
//! let store = Store::new(kv);
//! store.initialize()?;
//!
//! store.update(|tx| store.create_user(tx, User::new(1, "alice")))?;
//! let alice = store.view(|tx| store.get_user_by_name(tx, "alice"))?;
//! assert_eq!(alice.id.get(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod buckets;
mod entity;
mod error;
mod id;
mod indexed;
mod mappings;
mod organizations;
pub mod schema;
mod store;
mod users;

pub use entity::{Entity, EntityKey, Index};
pub use error::{StoreError, StoreResult};
pub use id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator, MAX_ID_GENERATION_ATTEMPTS};
pub use indexed::IndexedStore;
pub use schema::UrmKey;
pub use store::Store;
