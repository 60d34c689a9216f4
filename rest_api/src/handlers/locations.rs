// rest_api/src/handlers/locations.rs
//
// Cascading selection endpoints: each takes one parent id and returns its
// child rows. Location data is public reference data.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

pub async fn list_districts(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let districts = state.locations.list_districts().await?;
    Ok(Json(json!({ "status": "success", "items": districts })))
}

pub async fn sectors_in_district(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let sectors = state.locations.sectors_in_district(id).await?;
    Ok(Json(json!({ "status": "success", "items": sectors })))
}

pub async fn cells_in_sector(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let cells = state.locations.cells_in_sector(id).await?;
    Ok(Json(json!({ "status": "success", "items": cells })))
}

pub async fn villages_in_cell(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let villages = state.locations.villages_in_cell(id).await?;
    Ok(Json(json!({ "status": "success", "items": villages })))
}
