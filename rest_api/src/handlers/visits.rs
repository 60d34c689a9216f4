// rest_api/src/handlers/visits.rs

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::access::Resource;
use models::medical::{FacilityStatus, VisitStatus};
use security::{allowed, authorize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

/// The active-only view of encounters.
pub async fn current_visits(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Visits)?;
    let visits = state.visits.current_visits(&scope).await?;
    Ok(Json(json!({ "status": "success", "current_visits": visits })))
}

/// Visit detail, with the hospitals eligible as transfer destinations.
pub async fn visit_detail(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Visits)?;
    let visit = state
        .visits
        .get_visit(id)
        .await?
        .filter(|v| scope.permits(v))
        .ok_or_else(|| ApiError::NotFound(format!("visit {} was not found", id)))?;

    let hospitals = state
        .facilities
        .list_by_status(FacilityStatus::Hospital)
        .await?;
    let appointments = state.appointments.appointments_for_visit(visit.id).await?;
    let transfers = state.transfers.transfers_for_visit(visit.id).await?;

    Ok(Json(json!({
        "status": "success",
        "visit": visit,
        "hospitals": hospitals,
        "appointments": appointments,
        "transfers": transfers,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: VisitStatus,
}

/// Moves a visit to a new lifecycle status; a recovered or deceased visit
/// drops out of the current view.
pub async fn set_status(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Visits)?;
    state
        .visits
        .get_visit(id)
        .await?
        .filter(|v| scope.permits(v))
        .ok_or_else(|| ApiError::NotFound(format!("visit {} was not found", id)))?;

    let visit = state.visits.set_status(id, payload.status).await?;
    Ok(Json(json!({ "status": "success", "visit": visit })))
}
