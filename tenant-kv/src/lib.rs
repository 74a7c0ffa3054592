//! Ordered key-value engine for the tenant store.
//!
//! Provides named buckets of byte keys kept in ascending order, with
//! closure-scoped transactions:
//!
//! - [`KvStore::view`] runs a read-only transaction that observes one
//!   consistent snapshot and never commits.
//! - [`KvStore::update`] runs an exclusive read-write transaction that
//!   commits when the closure returns `Ok` and rolls back on `Err`, so
//!   every write made inside it lands together or not at all.
//!
//! Storage is embedded SQLite; each bucket is one table.

mod config;
mod error;
mod store;
mod tx;

pub use config::KvConfig;
pub use error::{KvError, KvResult};
pub use store::KvStore;
pub use tx::{Bucket, ScanOptions, Tx};
