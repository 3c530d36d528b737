//! Settlement queries over the joined dataset.

pub mod engine;
pub mod types;

pub use engine::QueryEngine;
pub use types::{HourlySettlement, MonthlyAverage, QueryError, TimeRange};
