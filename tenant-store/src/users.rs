//! User records and their passwords.

use crate::entity::Entity;
use crate::error::{StoreError, StoreResult};
use crate::schema::{USER_NAME_INDEX, USER_PASSWORD_BUCKET};
use crate::Store;
use tenant_kv::Tx;
use tenant_types::{FindOptions, Id, User, UserUpdate};
use tracing::debug;

impl Store {
    /// Stores a new user. An invalid (zero) id is replaced by a generated
    /// one. Returns the stored user.
    pub fn create_user(&self, tx: &Tx<'_>, mut user: User) -> StoreResult<User> {
        user.id = self.assign_id(tx, &self.users, user.id)?;
        self.users.create(tx, &user)?;
        Ok(user)
    }

    pub fn get_user(&self, tx: &Tx<'_>, id: Id) -> StoreResult<User> {
        self.users.get(tx, &id)
    }

    pub fn get_user_by_name(&self, tx: &Tx<'_>, name: &str) -> StoreResult<User> {
        self.users.get_by_index(tx, &USER_NAME_INDEX, name.as_bytes())
    }

    /// Users in ascending id order.
    pub fn list_users(&self, tx: &Tx<'_>, opts: &FindOptions) -> StoreResult<Vec<User>> {
        self.users.list(tx, opts)
    }

    pub fn update_user(&self, tx: &Tx<'_>, id: Id, upd: UserUpdate) -> StoreResult<User> {
        self.users.update(tx, &id, |user| upd.apply(user))
    }

    /// Removes the user and its password. Resource mappings that name the
    /// user are left in place.
    pub fn delete_user(&self, tx: &Tx<'_>, id: Id) -> StoreResult<()> {
        self.users.delete(tx, &id)?;
        if tx.bucket(USER_PASSWORD_BUCKET)?.delete(&id.encode())? {
            debug!(user = %id, "removed password of deleted user");
        }
        Ok(())
    }

    /// Stores an already-hashed credential for an existing user.
    pub fn set_password(&self, tx: &Tx<'_>, id: Id, hash: &str) -> StoreResult<()> {
        if !self.users.contains(tx, &id)? {
            return Err(StoreError::NotFound { kind: User::KIND });
        }
        tx.bucket(USER_PASSWORD_BUCKET)?
            .put(&id.encode(), &serde_json::to_vec(hash)?)?;
        Ok(())
    }

    /// Returns the stored credential for a user.
    pub fn get_password(&self, tx: &Tx<'_>, id: Id) -> StoreResult<String> {
        let raw = tx
            .bucket(USER_PASSWORD_BUCKET)?
            .get(&id.encode())?
            .ok_or(StoreError::NotFound {
                kind: "user password",
            })?;
        Ok(serde_json::from_slice(&raw)?)
    }
}
