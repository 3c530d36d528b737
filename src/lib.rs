//! Hourly and monthly project settlement queries over joined price and generation data.

/// REST API exposing the settlement queries.
#[cfg(feature = "api")]
pub mod api;
pub mod config;
pub mod dataset;
/// File readers for the source tables and CSV export of query results.
pub mod io;
pub mod query;
