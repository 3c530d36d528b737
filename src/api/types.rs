//! API response and query types.
//!
//! Field names are the public JSON contract and differ from the internal
//! result structs.

use serde::{Deserialize, Serialize};

use crate::query::{HourlySettlement, MonthlyAverage};

/// Query parameters shared by both endpoints.
#[derive(Debug, Deserialize)]
pub struct SettlementQuery {
    /// Range start, epoch milliseconds (inclusive).
    pub start_time: i64,
    /// Range end, epoch milliseconds (exclusive).
    pub end_time: i64,
    /// Exact settlement point name.
    pub settlement_location: String,
}

/// One hourly settlement row.
#[derive(Debug, Serialize)]
pub struct HourlySettlementRecord {
    /// Hour start, epoch milliseconds.
    pub time: i64,
    pub hourly_project_settlement: f64,
}

impl From<&HourlySettlement> for HourlySettlementRecord {
    fn from(r: &HourlySettlement) -> Self {
        Self {
            time: r.timestamp.and_utc().timestamp_millis(),
            hourly_project_settlement: r.settlement,
        }
    }
}

/// One monthly average row.
///
/// Maps internal `MonthlyAverage` fields to the public API contract:
/// - `settlement` → `hourly_project_settlement`
/// - `price` → `settlement_point_price`
#[derive(Debug, Serialize)]
pub struct MonthlyAverageRecord {
    pub year: i32,
    pub month: u32,
    /// Mean hourly project settlement.
    pub hourly_project_settlement: f64,
    /// Mean settlement point price.
    pub settlement_point_price: f64,
    /// Mean generation.
    pub generation: f64,
}

impl From<&MonthlyAverage> for MonthlyAverageRecord {
    fn from(r: &MonthlyAverage) -> Self {
        Self {
            year: r.year,
            month: r.month,
            hourly_project_settlement: r.settlement,
            settlement_point_price: r.price,
            generation: r.generation,
        }
    }
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}
