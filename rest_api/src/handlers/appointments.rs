// rest_api/src/handlers/appointments.rs

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::access::Resource;
use models::medical::AppointmentUpsert;
use security::{allowed, authorize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_appointments(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::FACILITY_STAFF, Resource::Appointments)?;
    let appointments = state.appointments.list_appointments(&scope).await?;
    Ok(Json(json!({ "status": "success", "appointments": appointments })))
}

pub async fn appointments_for_visit(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(visit_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Appointments)?;
    state
        .visits
        .get_visit(visit_id)
        .await?
        .filter(|v| scope.permits(v))
        .ok_or_else(|| ApiError::NotFound(format!("visit {} was not found", visit_id)))?;

    let appointments = state.appointments.appointments_for_visit(visit_id).await?;
    Ok(Json(json!({ "status": "success", "appointments": appointments })))
}

#[derive(Debug, Deserialize)]
pub struct ManageAppointmentsRequest {
    pub appointments: Vec<AppointmentUpsert>,
}

/// Replaces the appointment set of one visit: submitted rows are created or
/// updated, stored rows left out of the submission are deleted.
pub async fn manage_appointments(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(visit_id): Path<Uuid>,
    Json(payload): Json<ManageAppointmentsRequest>,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Appointments)?;
    state
        .visits
        .get_visit(visit_id)
        .await?
        .filter(|v| scope.permits(v))
        .ok_or_else(|| ApiError::NotFound(format!("visit {} was not found", visit_id)))?;

    let appointments = state
        .appointments
        .sync_for_visit(visit_id, payload.appointments)
        .await?;
    Ok(Json(json!({ "status": "success", "appointments": appointments })))
}
