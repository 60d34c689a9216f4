// rest_api/src/handlers/transfers.rs

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use models::access::Resource;
use models::medical::parse_client_timestamp;
use security::{allowed, authorize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

pub async fn list_transfers(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Transfers)?;
    let transfers = state.transfers.list_transfers(&scope).await?;
    Ok(Json(json!({
        "status": "success",
        "patients_transferred": transfers,
    })))
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub hospital_id: Uuid,
}

/// Moves a visit's patient to a hospital. The transfer row and the visit's
/// `is_transferred` flag are written in one storage transaction; the
/// destination must be a hospital.
pub async fn transfer_patient(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(visit_id): Path<Uuid>,
    Json(payload): Json<TransferRequest>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::ALL_ROLES, Resource::Transfers)?;

    let hospital = state
        .facilities
        .get_facility(payload.hospital_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "health facility {} was not found",
                payload.hospital_id
            ))
        })?;

    let transfer = state.transfers.create_transfer(visit_id, &hospital).await?;
    info!(transfer = %transfer.id, visit = %visit_id, hospital = %hospital.name, "transfer recorded");

    // notifications fire only after the transactional write committed
    if let Some(visit) = state.visits.get_visit(visit_id).await? {
        if let Some(patient) = state.patients.get_patient(visit.patient_id).await? {
            let message = format!("You have been transferred to {}", hospital.name);
            state
                .dispatcher
                .sms_best_effort(patient.phone_number.as_deref(), &message);
            state
                .dispatcher
                .email_best_effort(patient.email.as_deref(), &message);
        }
        state.dispatcher.email_best_effort(
            hospital.email.as_deref(),
            "A patient transfer to your hospital has been recorded",
        );
        if let Some(worker_id) = visit.community_work_id {
            if let Some(worker) = state.community_workers.get_worker(worker_id).await? {
                state.dispatcher.email_best_effort(
                    worker.email.as_deref(),
                    "A patient you follow has been transferred to a hospital",
                );
            }
        }
    }

    Ok(Json(json!({ "status": "success", "transfer": transfer })))
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmArrivalRequest {
    /// Optional client-side arrival instant; defaults to now. Offset-less
    /// values are interpreted as UTC.
    pub arrived_at: Option<String>,
}

pub async fn confirm_arrival(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(transfer_id): Path<Uuid>,
    payload: Option<Json<ConfirmArrivalRequest>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::ALL_ROLES, Resource::Transfers)?;

    let arrived_at = match payload.and_then(|Json(p)| p.arrived_at) {
        Some(raw) => parse_client_timestamp(&raw)?,
        None => Utc::now(),
    };

    let transfer = state
        .transfers
        .confirm_arrival(transfer_id, arrived_at)
        .await?;
    Ok(Json(json!({
        "status": "success",
        "message": "arrival confirmed successfully",
        "transfer": transfer,
    })))
}
