// models/src/medical/user.rs
//
// Accounts are stored with a bcrypt hash, never the plaintext password.
// `first_login` starts true and forces a password change before any scoped
// operation is allowed.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::access::Scoped;
use crate::medical::role::Role;

/// DTO for account creation; temporarily holds the plaintext password for
/// hashing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub chw_assigned: Option<Uuid>,
    pub health_facility_assigned: Option<Uuid>,
    pub profile_pic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub chw_assigned: Option<Uuid>,
    pub health_facility_assigned: Option<Uuid>,
    pub profile_pic: Option<String>,
    pub is_superuser: bool,
    pub first_login: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Hashes a plaintext password.
    pub fn hash_password(password: &str) -> Result<String, BcryptError> {
        hash(password, DEFAULT_COST)
    }

    /// Verifies a plaintext password against a stored hash.
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, BcryptError> {
        verify(password, hash)
    }

    /// Creates a stored `User` from a `NewUser` DTO, hashing the password.
    pub fn from_new_user(new_user: NewUser) -> Result<Self, BcryptError> {
        let password_hash = Self::hash_password(&new_user.password)?;

        Ok(User {
            id: Uuid::new_v4(),
            username: new_user.username,
            password_hash,
            role: new_user.role,
            chw_assigned: new_user.chw_assigned,
            health_facility_assigned: new_user.health_facility_assigned,
            profile_pic: new_user.profile_pic,
            is_superuser: false,
            first_login: true,
            created_at: Utc::now(),
        })
    }

    /// Replaces the credential and clears the first-login flag.
    pub fn set_password(&mut self, password: &str) -> Result<(), BcryptError> {
        self.password_hash = Self::hash_password(password)?;
        self.first_login = false;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl Scoped for User {
    fn community_work_ref(&self) -> Option<Uuid> {
        self.chw_assigned
    }
    fn facility_ref(&self) -> Option<Uuid> {
        self.health_facility_assigned
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, User};
    use crate::medical::role::Role;

    fn new_user() -> NewUser {
        NewUser {
            username: "nurse1".to_string(),
            password: "supersecret".to_string(),
            role: Role::Chw,
            chw_assigned: None,
            health_facility_assigned: None,
            profile_pic: None,
        }
    }

    #[test]
    fn from_new_user_hashes_password_and_sets_first_login() {
        let user = User::from_new_user(new_user()).unwrap();
        assert!(user.first_login);
        assert_ne!(user.password_hash, "supersecret");
        assert!(User::verify_password("supersecret", &user.password_hash).unwrap());
        assert!(!User::verify_password("wrong", &user.password_hash).unwrap());
    }

    #[test]
    fn set_password_clears_first_login() {
        let mut user = User::from_new_user(new_user()).unwrap();
        user.set_password("changed-it").unwrap();
        assert!(!user.first_login);
        assert!(User::verify_password("changed-it", &user.password_hash).unwrap());
    }
}
