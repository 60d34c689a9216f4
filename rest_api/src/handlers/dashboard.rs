// rest_api/src/handlers/dashboard.rs

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use models::access::Resource;
use models::medical::Visit;
use security::{allowed, authorize};

use crate::auth::Auth;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Serialize, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

/// Visit counts grouped by diagnosis classification and by status, in the
/// shape the dashboard charts consume.
pub fn chart_data(visits: &[Visit]) -> (ChartSeries, ChartSeries) {
    let mut by_diagnosis: BTreeMap<&'static str, usize> = BTreeMap::new();
    let mut by_status: BTreeMap<&'static str, usize> = BTreeMap::new();

    for visit in visits {
        *by_diagnosis.entry(visit.diagnosis.as_str()).or_default() += 1;
        *by_status.entry(visit.status.as_str()).or_default() += 1;
    }

    let collect = |map: BTreeMap<&'static str, usize>| {
        let mut series = ChartSeries::default();
        for (label, count) in map {
            series.labels.push(label.to_string());
            series.counts.push(count);
        }
        series
    };

    (collect(by_diagnosis), collect(by_status))
}

/// Role-scoped home view: recent rows, totals, today's intake and chart
/// series.
pub async fn overview(
    State(state): State<AppState>,
    Auth(ctx): Auth,
) -> Result<Json<Value>, ApiError> {
    let visit_scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Visits)?;
    let transfer_scope = authorize(&ctx, allowed::ALL_ROLES, Resource::Transfers)?;

    let visits = state.visits.list_visits(&visit_scope).await?;
    let transfers = state.transfers.list_transfers(&transfer_scope).await?;

    let today = Utc::now().date_naive();
    let today_patients = visits
        .iter()
        .filter(|v| v.date.date_naive() == today)
        .count();

    let (diagnosis_chart, status_chart) = chart_data(&visits);

    Ok(Json(json!({
        "status": "success",
        "recent_transfers": transfers.iter().take(4).collect::<Vec<_>>(),
        "recent_patients": visits.iter().take(4).collect::<Vec<_>>(),
        "total_transfer": transfers.len(),
        "total_patient": visits.len(),
        "today_patient": today_patients,
        "visit_chart_data": {
            "diagnosis_classification": diagnosis_chart,
            "status": status_chart,
        },
    })))
}
