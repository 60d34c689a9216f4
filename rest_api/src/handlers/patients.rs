// rest_api/src/handlers/patients.rs

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use models::access::Resource;
use models::medical::{DiagnosisClass, Patient, Visit};
use models::validation::validate_phone_number;
use security::{allowed, authorize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PatientForm {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub identity: Option<String>,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

/// Registers a patient. When the national identity is already on file, no
/// row is written and the existing record is pointed at instead.
pub async fn add_patient(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Json(form): Json<PatientForm>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::INTAKE, Resource::Patients)?;

    if let Some(phone) = &form.phone_number {
        validate_phone_number(phone)?;
    }

    if let Some(identity) = form.identity.as_deref() {
        if let Some(existing) = state.patients.find_by_identity(identity).await? {
            return Ok(Json(json!({
                "status": "exists",
                "message": "a patient with this identity is already registered",
                "patient_id": existing.id,
            })));
        }
    }

    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: form.first_name,
        middle_name: form.middle_name,
        last_name: form.last_name,
        district_id: form.district_id,
        sector_id: form.sector_id,
        cell_id: form.cell_id,
        village_id: form.village_id,
        phone_number: form.phone_number,
        identity: form.identity,
        email: form.email,
        profile_pic: form.profile_pic,
        health_facility_id: ctx.facility_assigned,
        community_work_id: ctx.chw_assigned,
        created_at: Utc::now(),
    };
    state.patients.add_patient(&patient).await?;

    let welcome =
        "Thanks for coming to our health center. Your information was recorded successfully";
    state
        .dispatcher
        .sms_best_effort(patient.phone_number.as_deref(), welcome);
    state
        .dispatcher
        .email_best_effort(patient.email.as_deref(), welcome);

    Ok(Json(json!({ "status": "success", "patient": patient })))
}

pub async fn list_patients(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::FACILITY_STAFF, Resource::Patients)?;
    let patients = state.patients.list_patients(&scope).await?;
    Ok(Json(json!({ "status": "success", "patients": patients })))
}

pub async fn patient_detail(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Patients)?;
    let patient = state
        .patients
        .get_patient(id)
        .await?
        .filter(|p| scope.permits(p))
        .ok_or_else(|| ApiError::NotFound(format!("patient {} was not found", id)))?;

    let visits = state.visits.visits_for_patient(patient.id).await?;
    Ok(Json(json!({
        "status": "success",
        "patient": patient,
        "visits": visits,
    })))
}

#[derive(Debug, Deserialize)]
pub struct VisitForm {
    pub disease: String,
    pub weight: f64,
    pub bmi: f64,
    pub diagnosis: DiagnosisClass,
    pub community_work_id: Option<Uuid>,
    pub health_facility_id: Option<Uuid>,
}

/// Visit intake: records a new encounter for an existing patient, then fires
/// best-effort notifications to everyone involved.
pub async fn add_visit(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Path(patient_id): Path<Uuid>,
    Json(form): Json<VisitForm>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::ALL_ROLES, Resource::Visits)?;

    let patient = state
        .patients
        .get_patient(patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("patient {} was not found", patient_id)))?;

    // fall back to the acting user's assignments, the way intake forms are
    // pre-filled
    let community_work_id = form.community_work_id.or(ctx.chw_assigned);
    let health_facility_id = form.health_facility_id.or(ctx.facility_assigned);

    if let Some(facility_id) = health_facility_id {
        state
            .facilities
            .get_facility(facility_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("health facility {} was not found", facility_id))
            })?;
    }

    let visit = Visit::new(
        patient.id,
        community_work_id,
        health_facility_id,
        form.disease,
        form.weight,
        form.bmi,
        form.diagnosis,
    );
    state.visits.add_visit(&visit).await?;
    info!(visit = %visit.id, patient = %patient.id, "visit recorded");

    let accepted = format!("{} You have been accepted by ANC Track", patient.first_name);
    state
        .dispatcher
        .sms_best_effort(patient.phone_number.as_deref(), &accepted);

    let recorded =
        "Thanks for coming to our health center. Your visit information was recorded successfully";
    state
        .dispatcher
        .email_best_effort(patient.email.as_deref(), recorded);
    if let Some(facility_id) = visit.health_facility_id {
        if let Some(facility) = state.facilities.get_facility(facility_id).await? {
            state
                .dispatcher
                .email_best_effort(facility.email.as_deref(), recorded);
        }
    }
    if let Some(worker_id) = visit.community_work_id {
        if let Some(worker) = state.community_workers.get_worker(worker_id).await? {
            state
                .dispatcher
                .email_best_effort(worker.email.as_deref(), recorded);
        }
    }

    Ok(Json(json!({ "status": "success", "visit": visit })))
}
