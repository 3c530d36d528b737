//! Typed rows of the two source tables and of the joined table.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use thiserror::Error;

/// Highest accepted delivery hour. Hour 24 rolls over to 00:00 of the next day.
pub const MAX_DELIVERY_HOUR: i64 = 24;

/// A source table did not match the expected schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A required column is absent.
    #[error("missing column \"{0}\"")]
    MissingColumn(String),
    /// A column's type cannot be read as the expected type.
    #[error("column \"{column}\" has unsupported type {data_type}: {message}")]
    UnexpectedType {
        column: String,
        data_type: String,
        message: String,
    },
    /// Delivery hour outside `[0, 24]`.
    #[error("delivery hour {0} is outside [0, 24]")]
    HourOutOfRange(i64),
    /// Delivery date and hour do not name a representable timestamp.
    #[error("delivery date {date} hour {hour} is outside the supported time range")]
    TimestampOutOfRange { date: NaiveDate, hour: u8 },
    /// A cell could not be read as the column's type.
    #[error("row {row}, column \"{column}\": {message}")]
    InvalidValue {
        /// Zero-based data row index.
        row: usize,
        /// Column name as it appears in the source.
        column: String,
        /// What was wrong with the value.
        message: String,
    },
}

impl SchemaError {
    pub(crate) fn invalid(row: usize, column: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            row,
            column: column.to_string(),
            message: message.into(),
        }
    }
}

/// One settlement price row.
///
/// The price table identifies delivery time by calendar date plus delivery
/// hour rather than by a timestamp. Sub-hour delivery intervals are not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    delivery_date: NaiveDate,
    delivery_hour: u8,
    timestamp: NaiveDateTime,
    /// Settlement point (location) name.
    pub location: String,
    /// Settlement point type (hub, load zone, resource node), when present.
    pub point_type: Option<String>,
    /// Settlement price for the hour.
    pub price: f64,
}

impl PriceRecord {
    /// Creates a price record, validating the delivery hour.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::HourOutOfRange`] if `delivery_hour` is not in
    /// `[0, 24]`, or [`SchemaError::TimestampOutOfRange`] if hour 24 rolls past
    /// the last representable date.
    pub fn new(
        delivery_date: NaiveDate,
        delivery_hour: i64,
        location: impl Into<String>,
        price: f64,
    ) -> Result<Self, SchemaError> {
        let hour = u8::try_from(delivery_hour)
            .ok()
            .filter(|h| i64::from(*h) <= MAX_DELIVERY_HOUR)
            .ok_or(SchemaError::HourOutOfRange(delivery_hour))?;
        let timestamp = delivery_date
            .and_time(NaiveTime::MIN)
            .checked_add_signed(TimeDelta::hours(i64::from(hour)))
            .ok_or(SchemaError::TimestampOutOfRange {
                date: delivery_date,
                hour,
            })?;

        Ok(Self {
            delivery_date,
            delivery_hour: hour,
            timestamp,
            location: location.into(),
            point_type: None,
            price,
        })
    }

    /// Attaches the settlement point type.
    pub fn with_point_type(mut self, point_type: impl Into<String>) -> Self {
        self.point_type = Some(point_type.into());
        self
    }

    pub fn delivery_date(&self) -> NaiveDate {
        self.delivery_date
    }

    pub fn delivery_hour(&self) -> u8 {
        self.delivery_hour
    }

    /// Normalized hour-grain timestamp used as the join key.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// One modeled generation row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRecord {
    timestamp: NaiveDateTime,
    /// Modeled output for the hour.
    pub generation: f64,
}

impl GenerationRecord {
    /// Creates a generation record, truncating `timestamp` to the containing hour.
    pub fn new(timestamp: NaiveDateTime, generation: f64) -> Self {
        Self {
            timestamp: truncate_to_hour(timestamp),
            generation,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }
}

/// A price row joined with the generation of the same hour.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    /// Hour-grain timestamp.
    pub timestamp: NaiveDateTime,
    /// Settlement point name.
    pub location: String,
    /// Settlement point price.
    pub price: f64,
    /// Modeled generation.
    pub generation: f64,
}

impl JoinedRecord {
    /// Hourly project settlement: `price * generation`.
    pub fn settlement(&self) -> f64 {
        self.price * self.generation
    }
}

fn truncate_to_hour(ts: NaiveDateTime) -> NaiveDateTime {
    NaiveTime::from_hms_opt(ts.hour(), 0, 0).map_or(ts, |hour| ts.date().and_time(hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn price_timestamp_combines_date_and_hour() {
        let rec = PriceRecord::new(date(2015, 3, 8), 13, "HB_HOUSTON", 21.5).unwrap();
        assert_eq!(
            rec.timestamp(),
            date(2015, 3, 8).and_hms_opt(13, 0, 0).unwrap()
        );
    }

    #[test]
    fn hour_24_rolls_over_to_next_day() {
        let rec = PriceRecord::new(date(2015, 12, 31), 24, "HB_HOUSTON", 21.5).unwrap();
        assert_eq!(rec.timestamp(), date(2016, 1, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(rec.delivery_hour(), 24);
    }

    #[test]
    fn hour_out_of_range_rejected() {
        assert_eq!(
            PriceRecord::new(date(2015, 1, 1), 25, "X", 1.0),
            Err(SchemaError::HourOutOfRange(25))
        );
        assert_eq!(
            PriceRecord::new(date(2015, 1, 1), -1, "X", 1.0),
            Err(SchemaError::HourOutOfRange(-1))
        );
    }

    #[test]
    fn hour_24_on_last_date_rejected() {
        assert_eq!(
            PriceRecord::new(NaiveDate::MAX, 24, "X", 1.0),
            Err(SchemaError::TimestampOutOfRange {
                date: NaiveDate::MAX,
                hour: 24,
            })
        );
        let last = PriceRecord::new(NaiveDate::MAX, 23, "X", 1.0).unwrap();
        assert_eq!(last.timestamp(), NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap());
    }

    #[test]
    fn generation_timestamp_truncated_to_hour() {
        let ts = date(2015, 6, 1).and_hms_opt(7, 45, 12).unwrap();
        let rec = GenerationRecord::new(ts, 3.0);
        assert_eq!(rec.timestamp(), date(2015, 6, 1).and_hms_opt(7, 0, 0).unwrap());
    }

    #[test]
    fn truncation_at_time_range_edges() {
        let max = GenerationRecord::new(NaiveDateTime::MAX, 1.0);
        assert_eq!(max.timestamp(), NaiveDate::MAX.and_hms_opt(23, 0, 0).unwrap());
        let min = GenerationRecord::new(NaiveDateTime::MIN, 1.0);
        assert_eq!(min.timestamp(), NaiveDateTime::MIN);
    }

    #[test]
    fn settlement_is_price_times_generation() {
        let rec = JoinedRecord {
            timestamp: date(2015, 1, 1).and_hms_opt(0, 0, 0).unwrap(),
            location: "LZ_WEST".to_string(),
            price: 25.0,
            generation: 4.0,
        };
        assert_eq!(rec.settlement(), 100.0);
    }
}
