//! Tests for user records, passwords and transaction behavior.

mod common;

use common::{expected_users, new_store, seed_users, user};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tenant_kv::KvStore;
use tenant_store::{IdGenerator, Store, StoreError, MAX_ID_GENERATION_ATTEMPTS};
use tenant_types::{FindOptions, Id, Status, User, UserUpdate};

// ── Create ───────────────────────────────────────────────────────

#[test]
fn create_then_list_returns_all_in_id_order() {
    let store = new_store();
    seed_users(&store);

    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap();
    assert_eq!(users.len(), 10);
    assert_eq!(users, expected_users());
}

#[test]
fn create_rejects_duplicate_name() {
    let store = new_store();
    seed_users(&store);

    let err = store
        .update(|tx| store.create_user(tx, User::new(11, "user5")))
        .unwrap_err();
    assert!(matches!(
        &err,
        StoreError::DuplicateIndexedValue { kind: "user", field: "name", value } if value == "user5"
    ));
    assert_eq!(err.to_string(), "user with name user5 already exists");

    let missing = store.view(|tx| store.get_user(tx, Id::new(11))).unwrap_err();
    assert!(missing.is_not_found());
}

#[test]
fn create_rejects_duplicate_id() {
    let store = new_store();
    seed_users(&store);

    let err = store
        .update(|tx| store.create_user(tx, User::new(5, "someone-else")))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentifier { kind: "user", .. }));

    // The rejected name must not have been indexed.
    let err = store
        .view(|tx| store.get_user_by_name(tx, "someone-else"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn create_same_record_twice_is_duplicate_id() {
    let store = new_store();
    seed_users(&store);
    let err = store
        .update(|tx| store.create_user(tx, user(3)))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentifier { .. }));
}

#[test]
fn create_assigns_id_when_missing() {
    let store = new_store();
    let created = store
        .update(|tx| store.create_user(tx, User::new(Id::INVALID, "fresh")))
        .unwrap();
    assert_eq!(created.id, Id::new(1000));

    let fetched = store.view(|tx| store.get_user(tx, created.id)).unwrap();
    assert_eq!(fetched, created);
}

#[test]
fn create_skips_generated_ids_already_taken() {
    let store = new_store();
    store
        .update(|tx| store.create_user(tx, User::new(1000, "taken")))
        .unwrap();
    let created = store
        .update(|tx| store.create_user(tx, User::new(Id::INVALID, "next")))
        .unwrap();
    assert_eq!(created.id, Id::new(1001));
}

struct ZeroIds;

impl IdGenerator for ZeroIds {
    fn next_id(&self) -> Id {
        Id::INVALID
    }
}

#[test]
fn create_gives_up_when_generator_never_yields_valid_id() {
    let kv = Arc::new(KvStore::open_in_memory().unwrap());
    let store = Store::new(kv).with_id_generator(ZeroIds);
    store.initialize().unwrap();

    let err = store
        .update(|tx| store.create_user(tx, User::new(Id::INVALID, "nobody")))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::IdGenerationExhausted { kind: "user", attempts } if attempts == MAX_ID_GENERATION_ATTEMPTS
    ));
}

// ── Get ──────────────────────────────────────────────────────────

#[test]
fn get_by_id_and_by_name() {
    let store = new_store();
    seed_users(&store);

    let expected = User {
        id: Id::new(5),
        name: "user5".into(),
        oauth_id: None,
        status: Status::Active,
    };
    store
        .view(|tx| {
            assert_eq!(store.get_user(tx, Id::new(5))?, expected);
            assert_eq!(store.get_user_by_name(tx, "user5")?, expected);
            Ok(())
        })
        .unwrap();
}

#[test]
fn get_missing_is_not_found() {
    let store = new_store();
    seed_users(&store);

    store
        .view(|tx| {
            let err = store.get_user(tx, Id::new(500)).unwrap_err();
            assert!(matches!(err, StoreError::NotFound { kind: "user" }));
            assert_eq!(err.to_string(), "user not found");

            let err = store.get_user_by_name(tx, "notauser").unwrap_err();
            assert!(matches!(err, StoreError::NotFound { kind: "user" }));
            Ok(())
        })
        .unwrap();
}

#[test]
fn get_works_inside_update_transaction() {
    let store = new_store();
    let fetched = store
        .update(|tx| {
            store.create_user(tx, user(7))?;
            store.get_user_by_name(tx, "user7")
        })
        .unwrap();
    assert_eq!(fetched, user(7));
}

// ── List ─────────────────────────────────────────────────────────

#[test]
fn list_with_limit_and_offset() {
    let store = new_store();
    seed_users(&store);
    let expected = expected_users();

    store
        .view(|tx| {
            let users = store.list_users(tx, &FindOptions::new().limit(4))?;
            assert_eq!(users, expected[..4].to_vec());

            let users = store.list_users(tx, &FindOptions::new().offset(3))?;
            assert_eq!(users.len(), 7);
            assert_eq!(users, expected[3..].to_vec());

            let users = store.list_users(tx, &FindOptions::new().offset(3).limit(2))?;
            assert_eq!(users, expected[3..5].to_vec());
            Ok(())
        })
        .unwrap();
}

#[test]
fn list_past_the_end_is_empty() {
    let store = new_store();
    seed_users(&store);
    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::new().offset(10)))
        .unwrap();
    assert!(users.is_empty());
}

#[test]
fn zero_limit_is_unbounded() {
    let store = new_store();
    seed_users(&store);
    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::new().limit(0)))
        .unwrap();
    assert_eq!(users, expected_users());

    let opts: FindOptions = serde_json::from_str(r#"{"limit":0,"offset":2}"#).unwrap();
    let users = store.view(|tx| store.list_users(tx, &opts)).unwrap();
    assert_eq!(users, expected_users()[2..].to_vec());
}

#[test]
fn list_empty_store() {
    let store = new_store();
    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap();
    assert!(users.is_empty());
}

#[test]
fn list_orders_numerically_not_by_insertion() {
    let store = new_store();
    store
        .update(|tx| {
            for id in [300u64, 2, 0x1_0000, 17] {
                store.create_user(tx, user(id))?;
            }
            Ok(())
        })
        .unwrap();
    let ids: Vec<u64> = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap()
        .into_iter()
        .map(|u| u.id.get())
        .collect();
    assert_eq!(ids, vec![2, 17, 300, 0x1_0000]);
}

// ── Update ───────────────────────────────────────────────────────

#[test]
fn update_scenario() {
    let store = new_store();
    seed_users(&store);

    store
        .update(|tx| {
            let err = store
                .update_user(tx, Id::new(3), UserUpdate::name("user5"))
                .unwrap_err();
            assert_eq!(err.to_string(), "user with name user5 already exists");

            let renamed = store.update_user(tx, Id::new(3), UserUpdate::name("user30"))?;
            assert_eq!(renamed.name, "user30");

            let deactivated =
                store.update_user(tx, Id::new(3), UserUpdate::status(Status::Inactive))?;
            assert_eq!(deactivated.name, "user30");
            assert_eq!(deactivated.status, Status::Inactive);
            Ok(())
        })
        .unwrap();

    let mut expected = expected_users();
    expected[2].name = "user30".into();
    expected[2].status = Status::Inactive;
    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap();
    assert_eq!(users, expected);
}

#[test]
fn update_moves_name_index() {
    let store = new_store();
    seed_users(&store);
    store
        .update(|tx| store.update_user(tx, Id::new(3), UserUpdate::name("user30")))
        .unwrap();

    store
        .view(|tx| {
            assert_eq!(store.get_user_by_name(tx, "user30")?.id, Id::new(3));
            assert!(store.get_user_by_name(tx, "user3").unwrap_err().is_not_found());
            Ok(())
        })
        .unwrap();

    // The released name can be claimed by someone else.
    store
        .update(|tx| store.create_user(tx, User::new(42, "user3")))
        .unwrap();
}

#[test]
fn update_collision_leaves_record_unchanged() {
    let store = new_store();
    seed_users(&store);

    let err = store
        .update(|tx| {
            store.update_user(
                tx,
                Id::new(1),
                UserUpdate {
                    name: Some("user2".into()),
                    status: Some(Status::Inactive),
                },
            )
        })
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIndexedValue { .. }));

    store
        .view(|tx| {
            assert_eq!(store.get_user(tx, Id::new(1))?, user(1));
            assert_eq!(store.get_user_by_name(tx, "user2")?.id, Id::new(2));
            Ok(())
        })
        .unwrap();
}

#[test]
fn update_to_own_name_is_allowed() {
    let store = new_store();
    seed_users(&store);
    let updated = store
        .update(|tx| store.update_user(tx, Id::new(4), UserUpdate::name("user4")))
        .unwrap();
    assert_eq!(updated, user(4));
}

#[test]
fn update_missing_is_not_found() {
    let store = new_store();
    let err = store
        .update(|tx| store.update_user(tx, Id::new(9), UserUpdate::name("x")))
        .unwrap_err();
    assert!(err.is_not_found());
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn delete_scenario() {
    let store = new_store();
    seed_users(&store);

    store
        .update(|tx| {
            store.delete_user(tx, Id::new(1))?;
            let err = store.delete_user(tx, Id::new(1)).unwrap_err();
            assert!(matches!(err, StoreError::NotFound { kind: "user" }));
            store.delete_user(tx, Id::new(3))?;
            Ok(())
        })
        .unwrap();

    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap();
    let expected: Vec<User> = expected_users()
        .into_iter()
        .filter(|u| u.id != Id::new(1) && u.id != Id::new(3))
        .collect();
    assert_eq!(users.len(), 8);
    assert_eq!(users, expected);
}

#[test]
fn delete_releases_name() {
    let store = new_store();
    seed_users(&store);
    store
        .update(|tx| store.delete_user(tx, Id::new(5)))
        .unwrap();
    store
        .view(|tx| {
            assert!(store.get_user_by_name(tx, "user5").unwrap_err().is_not_found());
            Ok(())
        })
        .unwrap();
    store
        .update(|tx| store.create_user(tx, User::new(55, "user5")))
        .unwrap();
}

#[test]
fn delete_in_separate_transactions_is_not_idempotent() {
    let store = new_store();
    seed_users(&store);
    store.update(|tx| store.delete_user(tx, Id::new(2))).unwrap();
    let err = store
        .update(|tx| store.delete_user(tx, Id::new(2)))
        .unwrap_err();
    assert!(err.is_not_found());
}

// ── Passwords ────────────────────────────────────────────────────

#[test]
fn password_roundtrip_and_cleanup() {
    let store = new_store();
    seed_users(&store);

    store
        .update(|tx| store.set_password(tx, Id::new(2), "$2a$10$hash"))
        .unwrap();
    let hash = store.view(|tx| store.get_password(tx, Id::new(2))).unwrap();
    assert_eq!(hash, "$2a$10$hash");

    store.update(|tx| store.delete_user(tx, Id::new(2))).unwrap();
    let err = store
        .view(|tx| store.get_password(tx, Id::new(2)))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "user password" }));
}

#[test]
fn set_password_requires_user() {
    let store = new_store();
    let err = store
        .update(|tx| store.set_password(tx, Id::new(77), "hash"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { kind: "user" }));
}

// ── Transactions ─────────────────────────────────────────────────

#[test]
fn failed_transaction_rolls_back_creates() {
    let store = new_store();
    let result = store.update(|tx| {
        store.create_user(tx, user(1))?;
        store.create_user(tx, user(2))?;
        store.create_user(tx, User::new(3, "user1"))?;
        Ok(())
    });
    assert!(result.is_err());

    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap();
    assert!(users.is_empty());
    let err = store
        .view(|tx| store.get_user_by_name(tx, "user1"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn view_transaction_rejects_writes() {
    let store = new_store();
    let err = store
        .view(|tx| store.create_user(tx, user(1)))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Engine(tenant_kv::KvError::TxNotWritable)
    ));
}

#[test]
fn uninitialized_store_surfaces_engine_error() {
    let kv = Arc::new(KvStore::open_in_memory().unwrap());
    let store = Store::new(kv);
    let err = store
        .view(|tx| store.get_user(tx, Id::new(1)))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Engine(tenant_kv::KvError::BucketNotFound(_))
    ));
}

#[test]
fn store_persists_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tenant.db");
    {
        let store = Store::new(Arc::new(KvStore::open(&path).unwrap()));
        store.initialize().unwrap();
        seed_users(&store);
    }

    let store = Store::new(Arc::new(KvStore::open(&path).unwrap()));
    store.initialize().unwrap();
    let users = store
        .view(|tx| store.list_users(tx, &FindOptions::default()))
        .unwrap();
    assert_eq!(users, expected_users());
}
