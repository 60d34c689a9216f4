// storage/src/user_storage.rs

use async_trait::async_trait;
use bincode::config::{BigEndian, Configuration, Fixint};
use bincode::serde::{decode_from_slice, encode_to_vec};
use sled::{Db, Tree};
use uuid::Uuid;

use models::access::Scope;
use models::errors::{RecordError, RecordResult};
use models::medical::{Login, User};

use crate::bincode_config;

#[async_trait]
pub trait UserStorageEngine: Send + Sync + 'static {
    /// Adds a new user to the storage; the username must be free.
    async fn add_user(&self, user: &User) -> RecordResult<()>;
    /// Updates an existing user in the storage.
    async fn update_user(&self, user: &User) -> RecordResult<()>;
    /// Retrieves a user by their username.
    async fn get_user_by_username(&self, username: &str) -> RecordResult<Option<User>>;
    /// Retrieves a user by their unique ID.
    /// Note: this scans the tree; usernames are the primary key.
    async fn get_user_by_id(&self, id: Uuid) -> RecordResult<Option<User>>;
    /// Authenticates a user based on their login credentials.
    async fn authenticate_user(&self, login: &Login) -> RecordResult<Option<User>>;
    /// Lists users visible under the given scope.
    async fn list_users(&self, scope: &Scope) -> RecordResult<Vec<User>>;
}

/// Sled-backed implementation of the `UserStorageEngine` trait, keyed by
/// username.
pub struct SledUserStorage {
    tree: Tree,
    config: Configuration<BigEndian, Fixint>,
}

impl SledUserStorage {
    pub fn new(db: &Db) -> RecordResult<Self> {
        let tree = db.open_tree("users")?;
        Ok(Self {
            tree,
            config: bincode_config(),
        })
    }

    fn put(&self, user: &User) -> RecordResult<()> {
        let bytes = encode_to_vec(user, self.config.clone())?;
        self.tree.insert(user.username.as_bytes(), bytes)?;
        Ok(())
    }
}

#[async_trait]
impl UserStorageEngine for SledUserStorage {
    async fn add_user(&self, user: &User) -> RecordResult<()> {
        if self.tree.contains_key(user.username.as_bytes())? {
            return Err(RecordError::AlreadyExists(user.username.clone()));
        }
        self.put(user)
    }

    async fn update_user(&self, user: &User) -> RecordResult<()> {
        self.put(user)
    }

    async fn get_user_by_username(&self, username: &str) -> RecordResult<Option<User>> {
        if let Some(value) = self.tree.get(username.as_bytes())? {
            let (user, _): (User, usize) = decode_from_slice(&value, self.config.clone())?;
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    async fn get_user_by_id(&self, id: Uuid) -> RecordResult<Option<User>> {
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (user, _): (User, usize) = decode_from_slice(&value, self.config.clone())?;
            if user.id == id {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }

    async fn authenticate_user(&self, login: &Login) -> RecordResult<Option<User>> {
        if let Some(user) = self.get_user_by_username(&login.username).await? {
            match User::verify_password(&login.password, &user.password_hash) {
                Ok(true) => Ok(Some(user)),
                Ok(false) => Err(RecordError::Auth("incorrect password".to_string())),
                Err(e) => Err(RecordError::Auth(format!(
                    "password verification failed: {}",
                    e
                ))),
            }
        } else {
            Ok(None) // user not found, so no authentication possible
        }
    }

    async fn list_users(&self, scope: &Scope) -> RecordResult<Vec<User>> {
        let mut rows = Vec::new();
        for item in self.tree.iter() {
            let (_key, value) = item?;
            let (user, _): (User, usize) = decode_from_slice(&value, self.config.clone())?;
            if scope.permits(&user) {
                rows.push(user);
            }
        }
        rows.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::{SledUserStorage, UserStorageEngine};
    use models::errors::RecordError;
    use models::medical::{Login, NewUser, Role, User};

    fn new_user(username: &str) -> User {
        User::from_new_user(NewUser {
            username: username.to_string(),
            password: "supersecret".to_string(),
            role: Role::HealthFacility,
            chw_assigned: None,
            health_facility_assigned: None,
            profile_pic: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledUserStorage::new(&db).unwrap();

        store.add_user(&new_user("kigali_hc")).await.unwrap();
        let err = store.add_user(&new_user("kigali_hc")).await.unwrap_err();
        assert!(matches!(err, RecordError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn authenticate_checks_the_stored_hash() {
        let dir = tempfile::tempdir().unwrap();
        let db = sled::open(dir.path()).unwrap();
        let store = SledUserStorage::new(&db).unwrap();

        let user = new_user("nurse1");
        store.add_user(&user).await.unwrap();

        let ok = store
            .authenticate_user(&Login {
                username: "nurse1".to_string(),
                password: "supersecret".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(ok.map(|u| u.id), Some(user.id));

        let bad = store
            .authenticate_user(&Login {
                username: "nurse1".to_string(),
                password: "wrong".to_string(),
            })
            .await;
        assert!(matches!(bad, Err(RecordError::Auth(_))));

        let missing = store
            .authenticate_user(&Login {
                username: "nobody".to_string(),
                password: "supersecret".to_string(),
            })
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
