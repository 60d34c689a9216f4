// rest_api/src/lib.rs

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

use models::errors::RecordResult;
use notifications::Dispatcher;
use storage::{
    AppointmentStorageEngine, CommunityWorkerStorageEngine, DoctorStorageEngine,
    FacilityStorageEngine, LocationStorageEngine, PatientStorageEngine, SledAppointmentStorage,
    SledCommunityWorkerStorage, SledDoctorStorage, SledFacilityStorage, SledLocationStorage,
    SledPatientStorage, SledTransferStorage, SledUserStorage, SledVisitStorage,
    TransferStorageEngine, UserStorageEngine, VisitStorageEngine,
};

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

pub use config::{load_server_config, ServerConfig};
pub use error::ApiError;

// Shared state for the Axum application
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<dyn LocationStorageEngine>,
    pub patients: Arc<dyn PatientStorageEngine>,
    pub facilities: Arc<dyn FacilityStorageEngine>,
    pub doctors: Arc<dyn DoctorStorageEngine>,
    pub community_workers: Arc<dyn CommunityWorkerStorageEngine>,
    pub visits: Arc<dyn VisitStorageEngine>,
    pub transfers: Arc<dyn TransferStorageEngine>,
    pub appointments: Arc<dyn AppointmentStorageEngine>,
    pub users: Arc<dyn UserStorageEngine>,
    pub dispatcher: Arc<Dispatcher>,
    pub jwt_secret: Arc<Vec<u8>>,
}

impl AppState {
    /// Wires every storage engine onto one sled database.
    pub fn new(db: &sled::Db, dispatcher: Dispatcher, jwt_secret: Vec<u8>) -> RecordResult<Self> {
        Ok(Self {
            locations: Arc::new(SledLocationStorage::new(db)?),
            patients: Arc::new(SledPatientStorage::new(db)?),
            facilities: Arc::new(SledFacilityStorage::new(db)?),
            doctors: Arc::new(SledDoctorStorage::new(db)?),
            community_workers: Arc::new(SledCommunityWorkerStorage::new(db)?),
            visits: Arc::new(SledVisitStorage::new(db)?),
            transfers: Arc::new(SledTransferStorage::new(db)?),
            appointments: Arc::new(SledAppointmentStorage::new(db)?),
            users: Arc::new(SledUserStorage::new(db)?),
            dispatcher: Arc::new(dispatcher),
            jwt_secret: Arc::new(jwt_secret),
        })
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "message": "ANC Track REST API is healthy",
        "status": "ok"
    }))
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        // accounts
        .route("/api/v1/auth/register", post(handlers::accounts::register))
        .route("/api/v1/auth/login", post(handlers::accounts::login))
        .route(
            "/api/v1/auth/change-password",
            post(handlers::accounts::change_password),
        )
        .route("/api/v1/users", get(handlers::accounts::list_users))
        // cascading location lookups
        .route(
            "/api/v1/locations/districts",
            get(handlers::locations::list_districts),
        )
        .route(
            "/api/v1/locations/districts/:id/sectors",
            get(handlers::locations::sectors_in_district),
        )
        .route(
            "/api/v1/locations/sectors/:id/cells",
            get(handlers::locations::cells_in_sector),
        )
        .route(
            "/api/v1/locations/cells/:id/villages",
            get(handlers::locations::villages_in_cell),
        )
        // directory
        .route(
            "/api/v1/patients",
            get(handlers::patients::list_patients).post(handlers::patients::add_patient),
        )
        .route(
            "/api/v1/patients/:id",
            get(handlers::patients::patient_detail),
        )
        .route(
            "/api/v1/patients/:id/visits",
            post(handlers::patients::add_visit),
        )
        .route(
            "/api/v1/doctors",
            get(handlers::directory::list_doctors).post(handlers::directory::add_doctor),
        )
        .route(
            "/api/v1/community-workers",
            get(handlers::directory::list_workers).post(handlers::directory::add_worker),
        )
        .route(
            "/api/v1/health-facilities",
            get(handlers::directory::list_facilities).post(handlers::directory::add_facility),
        )
        // clinical records
        .route(
            "/api/v1/visits/current",
            get(handlers::visits::current_visits),
        )
        .route("/api/v1/visits/:id", get(handlers::visits::visit_detail))
        .route(
            "/api/v1/visits/:id/status",
            put(handlers::visits::set_status),
        )
        .route(
            "/api/v1/visits/:id/transfer",
            post(handlers::transfers::transfer_patient),
        )
        .route(
            "/api/v1/visits/:id/appointments",
            get(handlers::appointments::appointments_for_visit)
                .put(handlers::appointments::manage_appointments),
        )
        .route(
            "/api/v1/transfers",
            get(handlers::transfers::list_transfers),
        )
        .route(
            "/api/v1/transfers/:id/confirm-arrival",
            post(handlers::transfers::confirm_arrival),
        )
        .route(
            "/api/v1/appointments",
            get(handlers::appointments::list_appointments),
        )
        // dashboard
        .route("/api/v1/dashboard", get(handlers::dashboard::overview))
        .layer(cors)
        .with_state(state)
}
