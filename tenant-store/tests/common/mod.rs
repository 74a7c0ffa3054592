//! Shared test helpers for store tests.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use std::sync::Arc;
use tenant_kv::KvStore;
use tenant_store::{SequentialIdGenerator, Store};
use tenant_types::{Id, Status, User};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
}

/// An initialized in-memory store with sequential ids from 1000 and a
/// frozen clock.
pub fn new_store() -> Store {
    init_tracing();
    let kv = Arc::new(KvStore::open_in_memory().unwrap());
    let store = Store::new(kv)
        .with_id_generator(SequentialIdGenerator::starting_at(1000))
        .with_clock(fixed_time);
    store.initialize().unwrap();
    store
}

pub fn user(i: u64) -> User {
    User {
        id: Id::new(i),
        name: format!("user{i}"),
        oauth_id: None,
        status: Status::Active,
    }
}

/// Users 1..=10 named `user1`..`user10`, all active.
pub fn expected_users() -> Vec<User> {
    (1..=10).map(user).collect()
}

pub fn seed_users(store: &Store) {
    store
        .update(|tx| {
            for u in expected_users() {
                store.create_user(tx, u)?;
            }
            Ok(())
        })
        .unwrap();
}
