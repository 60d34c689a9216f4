// rest_api/src/handlers/directory.rs
//
// Doctors, community health workers and health facilities: listings are
// role-scoped; facility creation is admin-only.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use models::access::Resource;
use models::medical::{CommunityWorker, Doctor, FacilityStatus, HealthFacility, Role};
use models::validation::validate_phone_number;
use security::{allowed, authorize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PersonForm {
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub health_facility_id: Option<Uuid>,
    pub profile_pic: Option<String>,
}

impl PersonForm {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(phone) = &self.phone_number {
            validate_phone_number(phone)?;
        }
        Ok(())
    }
}

pub async fn list_doctors(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(&ctx, allowed::FACILITY_STAFF, Resource::Doctors)?;
    let doctors = state.doctors.list_doctors(&scope).await?;
    Ok(Json(json!({ "status": "success", "doctors": doctors })))
}

pub async fn add_doctor(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Json(form): Json<PersonForm>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::FACILITY_STAFF, Resource::Doctors)?;
    form.validate()?;

    let doctor = Doctor {
        id: Uuid::new_v4(),
        first_name: form.first_name,
        middle_name: form.middle_name,
        last_name: form.last_name,
        district_id: form.district_id,
        sector_id: form.sector_id,
        cell_id: form.cell_id,
        village_id: form.village_id,
        phone_number: form.phone_number,
        health_facility_id: form.health_facility_id.or(ctx.facility_assigned),
        profile_pic: form.profile_pic,
    };
    state.doctors.add_doctor(&doctor).await?;
    Ok(Json(json!({ "status": "success", "doctor": doctor })))
}

pub async fn list_workers(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let scope = authorize(
        &ctx,
        &[Role::Admin, Role::HealthFacility],
        Resource::CommunityWorkers,
    )?;
    let workers = state.community_workers.list_workers(&scope).await?;
    Ok(Json(json!({ "status": "success", "community_workers": workers })))
}

pub async fn add_worker(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Json(form): Json<PersonForm>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::INTAKE, Resource::CommunityWorkers)?;
    form.validate()?;

    let worker = CommunityWorker {
        id: Uuid::new_v4(),
        first_name: form.first_name,
        middle_name: form.middle_name,
        last_name: form.last_name,
        district_id: form.district_id,
        sector_id: form.sector_id,
        cell_id: form.cell_id,
        village_id: form.village_id,
        health_facility_id: form.health_facility_id.or(ctx.facility_assigned),
        phone_number: form.phone_number,
        email: form.email,
        profile_pic: form.profile_pic,
    };
    state.community_workers.add_worker(&worker).await?;
    Ok(Json(json!({ "status": "success", "community_worker": worker })))
}

#[derive(Debug, Deserialize)]
pub struct FacilityForm {
    pub name: String,
    pub district_id: Option<Uuid>,
    pub sector_id: Option<Uuid>,
    pub cell_id: Option<Uuid>,
    pub village_id: Option<Uuid>,
    pub director: String,
    pub phone_number: Option<String>,
    pub status: FacilityStatus,
    pub email: Option<String>,
    pub profile_pic: Option<String>,
}

pub async fn list_facilities(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::ADMIN_ONLY, Resource::HealthFacilities)?;
    let facilities = state.facilities.list_facilities().await?;
    Ok(Json(json!({ "status": "success", "health_facilities": facilities })))
}

pub async fn add_facility(
    State(state): State<AppState>,
    Auth(ctx): Auth,
    Json(form): Json<FacilityForm>,
) -> Result<Json<Value>, ApiError> {
    authorize(&ctx, allowed::ADMIN_ONLY, Resource::HealthFacilities)?;
    if let Some(phone) = &form.phone_number {
        validate_phone_number(phone)?;
    }

    let facility = HealthFacility {
        id: Uuid::new_v4(),
        name: form.name,
        district_id: form.district_id,
        sector_id: form.sector_id,
        cell_id: form.cell_id,
        village_id: form.village_id,
        director: form.director,
        phone_number: form.phone_number,
        status: form.status,
        email: form.email,
        profile_pic: form.profile_pic,
    };
    state.facilities.add_facility(&facility).await?;
    Ok(Json(json!({ "status": "success", "health_facility": facility })))
}
