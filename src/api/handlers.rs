//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use tracing::debug;

use super::AppState;
use super::types::{ErrorResponse, HourlySettlementRecord, MonthlyAverageRecord, SettlementQuery};
use crate::query::TimeRange;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Returns hourly project settlement for a location over a time range.
///
/// `GET /hourly_project_settlement?start_time=S&end_time=E&settlement_location=L`
/// → 200 + `Vec<HourlySettlementRecord>` JSON
pub async fn get_hourly_project_settlement(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SettlementQuery>,
) -> Result<Json<Vec<HourlySettlementRecord>>, ApiError> {
    let range = parse_range(&query)?;
    let rows = state
        .engine
        .hourly_project_settlement(&range, &query.settlement_location);
    debug!(
        location = %query.settlement_location,
        rows = rows.len(),
        "hourly project settlement"
    );

    Ok(Json(rows.iter().map(HourlySettlementRecord::from).collect()))
}

/// Returns monthly means of settlement, price and generation.
///
/// `GET /average_monthly_values?start_time=S&end_time=E&settlement_location=L`
/// → 200 + `Vec<MonthlyAverageRecord>` JSON
pub async fn get_average_monthly_values(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SettlementQuery>,
) -> Result<Json<Vec<MonthlyAverageRecord>>, ApiError> {
    let range = parse_range(&query)?;
    let months = state
        .engine
        .average_monthly_values(&range, &query.settlement_location);
    debug!(
        location = %query.settlement_location,
        months = months.len(),
        "average monthly values"
    );

    Ok(Json(months.iter().map(MonthlyAverageRecord::from).collect()))
}

/// An inverted range is not an error: it matches nothing.
fn parse_range(query: &SettlementQuery) -> Result<TimeRange, ApiError> {
    TimeRange::from_epoch_millis(query.start_time, query.end_time).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })
}
