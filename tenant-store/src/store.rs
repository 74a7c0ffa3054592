//! The [`Store`] facade: construction, initialization and transactions.

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::id::{IdGenerator, RandomIdGenerator, MAX_ID_GENERATION_ATTEMPTS};
use crate::indexed::IndexedStore;
use crate::schema::{
    ALL_BUCKETS, BUCKET_BUCKET, BUCKET_NAME_INDEX, ORGANIZATION_BUCKET, ORGANIZATION_NAME_INDEX,
    URM_BUCKET, URM_BY_USER, USER_BUCKET, USER_NAME_INDEX,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tenant_kv::{KvStore, Tx};
use tenant_types::{Bucket, Id, Organization, User, UserResourceMapping};
use tracing::{info, warn};

type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Persistence for users, organizations, buckets and user resource
/// mappings.
///
/// Every operation takes an open transaction; use [`Store::view`] and
/// [`Store::update`] (or the engine directly) to obtain one. The store
/// holds no state that outlives a transaction besides its bucket layout,
/// id generator and clock.
pub struct Store {
    kv: Arc<KvStore>,
    pub(crate) users: IndexedStore<User>,
    pub(crate) orgs: IndexedStore<Organization>,
    pub(crate) buckets: IndexedStore<Bucket>,
    pub(crate) urms: IndexedStore<UserResourceMapping>,
    id_gen: Arc<dyn IdGenerator>,
    clock: Clock,
}

impl Store {
    /// A store over `kv` with random ids and the system clock.
    pub fn new(kv: Arc<KvStore>) -> Self {
        Self {
            kv,
            users: IndexedStore::new(USER_BUCKET).with_index(USER_NAME_INDEX),
            orgs: IndexedStore::new(ORGANIZATION_BUCKET).with_index(ORGANIZATION_NAME_INDEX),
            buckets: IndexedStore::new(BUCKET_BUCKET).with_index(BUCKET_NAME_INDEX),
            urms: IndexedStore::new(URM_BUCKET).with_index(URM_BY_USER),
            id_gen: Arc::new(RandomIdGenerator),
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the id generator used for records created without an id.
    #[must_use]
    pub fn with_id_generator(mut self, id_gen: impl IdGenerator + 'static) -> Self {
        self.id_gen = Arc::new(id_gen);
        self
    }

    /// Replaces the clock used to stamp `created_at`/`updated_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Creates every bucket the store uses. Safe to call repeatedly.
    pub fn initialize(&self) -> StoreResult<()> {
        for bucket in ALL_BUCKETS {
            self.kv.create_bucket(bucket)?;
        }
        info!(buckets = ALL_BUCKETS.len(), "tenant store initialized");
        Ok(())
    }

    /// The underlying engine.
    pub fn kv(&self) -> &KvStore {
        &self.kv
    }

    /// Runs `f` in a read-only transaction.
    pub fn view<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Tx<'_>) -> StoreResult<T>,
    {
        self.kv.view(f)
    }

    /// Runs `f` in a read-write transaction; an `Err` rolls back every
    /// write it made.
    pub fn update<T, F>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Tx<'_>) -> StoreResult<T>,
    {
        self.kv.update(f)
    }

    /// Generic store for users.
    pub fn users(&self) -> &IndexedStore<User> {
        &self.users
    }

    /// Generic store for organizations.
    pub fn organizations(&self) -> &IndexedStore<Organization> {
        &self.orgs
    }

    /// Generic store for buckets.
    pub fn buckets(&self) -> &IndexedStore<Bucket> {
        &self.buckets
    }

    /// Generic store for user resource mappings.
    pub fn mappings(&self) -> &IndexedStore<UserResourceMapping> {
        &self.urms
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Returns `id` if it is valid, otherwise draws an unused id for `store`.
    pub(crate) fn assign_id<E>(&self, tx: &Tx<'_>, store: &IndexedStore<E>, id: Id) -> StoreResult<Id>
    where
        E: Entity<Key = Id>,
    {
        if id.is_valid() {
            return Ok(id);
        }
        for attempt in 1..=MAX_ID_GENERATION_ATTEMPTS {
            let candidate = self.id_gen.next_id();
            if candidate.is_valid() && !store.contains(tx, &candidate)? {
                return Ok(candidate);
            }
            warn!(kind = E::KIND, id = %candidate, attempt, "generated id unusable, retrying");
        }
        Err(StoreError::IdGenerationExhausted {
            kind: E::KIND,
            attempts: MAX_ID_GENERATION_ATTEMPTS,
        })
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("users", &self.users)
            .field("orgs", &self.orgs)
            .field("buckets", &self.buckets)
            .field("urms", &self.urms)
            .finish_non_exhaustive()
    }
}
