// rest_api/src/auth.rs

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use security::RequestContext;

use crate::error::ApiError;
use crate::AppState;

/// Extractor resolving the bearer token to a request-scoped context. Every
/// protected handler takes `Auth(ctx)` as an argument; the context is built
/// fresh per request from the stored account.
pub struct Auth(pub RequestContext);

#[async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|hv| hv.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing or invalid token".to_string()))?;

        let claims = security::validate_jwt_token(token, &state.jwt_secret)
            .map_err(|_| ApiError::Unauthorized("invalid token".to_string()))?;

        let user = state
            .users
            .get_user_by_username(&claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("unknown user".to_string()))?;

        Ok(Auth(RequestContext::from(&user)))
    }
}
