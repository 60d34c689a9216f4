// rest_api/src/handlers/accounts.rs

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use models::access::Resource;
use models::medical::{Login, User};
use security::{allowed, authorize, UserRegistration};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

/// JSON view of an account. The password hash never leaves the storage
/// layer.
pub(crate) fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "role": user.role,
        "chw_assigned": user.chw_assigned,
        "health_facility_assigned": user.health_facility_assigned,
        "profile_pic": user.profile_pic,
        "first_login": user.first_login,
        "created_at": user.created_at,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<UserRegistration>,
) -> Result<Json<Value>, ApiError> {
    let user = security::register_user(payload, state.users.clone()).await?;
    Ok(Json(json!({
        "status": "success",
        "user": user_json(&user),
    })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Login>,
) -> Result<Json<Value>, ApiError> {
    let (user, token) = security::login_user(payload, state.users.clone(), &state.jwt_secret).await?;
    Ok(Json(json!({
        "status": "success",
        "token": token,
        "user": user_json(&user),
        // the client must route a first login straight to the password change
        "password_change_required": user.first_login,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: String,
}

/// The only authenticated action available to a first-login account.
pub async fn change_password(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let user =
        security::change_password(&ctx.username, &payload.new_password, state.users.clone())
            .await?;
    Ok(Json(json!({
        "status": "success",
        "user": user_json(&user),
    })))
}

pub async fn list_users(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::FACILITY_STAFF, Resource::Users)?;
    let users = state.users.list_users(&scope).await?;
    let users: Vec<Value> = users.iter().map(user_json).collect();
    Ok(Json(json!({
        "status": "success",
        "users": users,
    })))
}
