//! Query inputs and result rows.

use chrono::{DateTime, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// Errors raised while building query arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Epoch milliseconds outside the representable date range.
    #[error("timestamp {0} ms is out of range")]
    InvalidTimestamp(i64),
}

/// Half-open time interval `[start, end)`.
///
/// A range with `start >= end` is valid and matches nothing.
///
/// # Examples
///
/// ```
/// use settlement_query::query::TimeRange;
///
/// let range = TimeRange::from_epoch_millis(1420070400000, 1420074000000).unwrap();
/// assert!(range.contains(range.start));
/// assert!(!range.contains(range.end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// Exclusive end.
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// Builds a range from Unix epoch milliseconds, read as UTC wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidTimestamp`] if either bound is outside the
    /// representable date range.
    pub fn from_epoch_millis(start_ms: i64, end_ms: i64) -> Result<Self, QueryError> {
        Ok(Self {
            start: naive_from_millis(start_ms)?,
            end: naive_from_millis(end_ms)?,
        })
    }

    /// `true` when no timestamp can fall inside the range.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

fn naive_from_millis(ms: i64) -> Result<NaiveDateTime, QueryError> {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.naive_utc())
        .ok_or(QueryError::InvalidTimestamp(ms))
}

/// Hourly project settlement for one hour at one location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlySettlement {
    pub timestamp: NaiveDateTime,
    /// `price * generation`.
    pub settlement: f64,
}

/// Means of one calendar month of filtered records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyAverage {
    pub year: i32,
    /// Calendar month, 1 through 12.
    pub month: u32,
    /// Mean hourly project settlement.
    pub settlement: f64,
    /// Mean settlement point price.
    pub price: f64,
    /// Mean generation.
    pub generation: f64,
}
