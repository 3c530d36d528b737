//! REST API for settlement queries.
//!
//! Provides two GET endpoints:
//! - `/hourly_project_settlement`: hourly `price * generation` for a location
//! - `/average_monthly_values`: per-month means for a location
//!
//! Both take `start_time` and `end_time` (epoch milliseconds, half-open
//! range) and `settlement_location`.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tracing::info;

use crate::query::QueryEngine;

pub use types::{ErrorResponse, HourlySettlementRecord, MonthlyAverageRecord, SettlementQuery};

/// Immutable application state shared across all request handlers.
///
/// Constructed once after the dataset is loaded and wrapped in `Arc`; no
/// locks needed since all data is read-only.
pub struct AppState {
    /// Query engine over the loaded dataset.
    pub engine: QueryEngine,
}

/// Builds the axum router with all API routes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/hourly_project_settlement",
            get(handlers::get_hourly_project_settlement),
        )
        .route(
            "/average_monthly_values",
            get(handlers::get_average_monthly_values),
        )
        .with_state(state)
}

/// Binds to the given address and serves the API until the server stops.
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
