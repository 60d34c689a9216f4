// security/src/lib.rs

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use models::medical::{Login, NewUser, Role, User};
use storage::user_storage::UserStorageEngine;

pub mod context;
pub mod policy;

pub use context::RequestContext;
pub use policy::{allowed, authorize, scope_for, AccessError};

/// User registration data transfer object (DTO).
#[derive(Debug, Deserialize, Serialize)]
pub struct UserRegistration {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub chw_assigned: Option<Uuid>,
    pub health_facility_assigned: Option<Uuid>,
    pub profile_pic: Option<String>,
}

/// Claims for JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (username)
    pub exp: u64,    // Expiration time
    pub iat: u64,    // Issued at
    pub role: Role,
}

/// Custom authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UserExists,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Internal server error: {0}")]
    InternalError(String),
    #[error("JWT error: {0}")]
    JwtError(String),
    #[error("Password hashing error: {0}")]
    PasswordHashError(String),
}

/// Generates a JWT token valid for 24 hours.
pub fn generate_jwt_token(username: &str, role: Role, secret: &[u8]) -> Result<String, AuthError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AuthError::JwtError(format!("System time error: {}", e)))?
        .as_secs();

    let claims = Claims {
        sub: username.to_string(),
        exp: now + (60 * 60 * 24),
        iat: now,
        role,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::JwtError(format!("Failed to encode JWT: {}", e)))
}

/// Decodes and validates a JWT token.
pub fn validate_jwt_token(token: &str, secret: &[u8]) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::JwtError(format!("Failed to decode or validate JWT: {}", e)))
}

/// Registers a new user. The account starts with `first_login = true`, so
/// the first authenticated action has to be a password change.
pub async fn register_user(
    registration: UserRegistration,
    store: Arc<dyn UserStorageEngine>,
) -> Result<User, AuthError> {
    if store
        .get_user_by_username(&registration.username)
        .await
        .map_err(|e| AuthError::InternalError(format!("storage error during user check: {}", e)))?
        .is_some()
    {
        return Err(AuthError::UserExists);
    }

    let new_user = User::from_new_user(NewUser {
        username: registration.username,
        password: registration.password,
        role: registration.role,
        chw_assigned: registration.chw_assigned,
        health_facility_assigned: registration.health_facility_assigned,
        profile_pic: registration.profile_pic,
    })
    .map_err(|e| AuthError::PasswordHashError(format!("failed to hash password: {}", e)))?;

    store
        .add_user(&new_user)
        .await
        .map_err(|e| AuthError::InternalError(format!("failed to create user: {}", e)))?;

    info!(username = %new_user.username, role = %new_user.role, "registered user");
    Ok(new_user)
}

/// Logs in a user. Returns the account and a JWT token on success.
pub async fn login_user(
    login: Login,
    store: Arc<dyn UserStorageEngine>,
    secret: &[u8],
) -> Result<(User, String), AuthError> {
    let user = store
        .authenticate_user(&login)
        .await
        .map_err(|e| match e {
            models::RecordError::Auth(_) => AuthError::InvalidCredentials,
            other => AuthError::InternalError(format!("storage error during login: {}", other)),
        })?
        .ok_or(AuthError::InvalidCredentials)?;

    let token = generate_jwt_token(&user.username, user.role, secret)?;
    Ok((user, token))
}

/// Replaces a user's password and clears the first-login flag.
pub async fn change_password(
    username: &str,
    new_password: &str,
    store: Arc<dyn UserStorageEngine>,
) -> Result<User, AuthError> {
    let mut user = store
        .get_user_by_username(username)
        .await
        .map_err(|e| AuthError::InternalError(format!("storage error during user fetch: {}", e)))?
        .ok_or(AuthError::InvalidCredentials)?;

    user.set_password(new_password)
        .map_err(|e| AuthError::PasswordHashError(format!("failed to hash password: {}", e)))?;

    store
        .update_user(&user)
        .await
        .map_err(|e| AuthError::InternalError(format!("failed to update user: {}", e)))?;

    info!(username = %user.username, "password changed");
    Ok(user)
}
