//! Range filtering and settlement aggregation over a shared [`Dataset`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;

use super::types::{HourlySettlement, MonthlyAverage, TimeRange};
use crate::dataset::{Dataset, JoinedRecord};

/// Read-only query engine.
///
/// Holds the dataset behind an `Arc`, so clones are cheap and can be handed
/// to concurrent request handlers. No query mutates the dataset.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    dataset: Arc<Dataset>,
}

impl QueryEngine {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Records of `location` whose timestamp lies in `range`, in timestamp order.
    ///
    /// Returns an empty slice for unknown locations and empty ranges.
    pub fn filter(&self, range: &TimeRange, location: &str) -> &[JoinedRecord] {
        if range.is_empty() {
            return &[];
        }
        let records = self.dataset.location(location);
        let lo = records.partition_point(|r| r.timestamp < range.start);
        let hi = records.partition_point(|r| r.timestamp < range.end);
        &records[lo..hi]
    }

    /// Hourly `price * generation` for `location` over `range`.
    pub fn hourly_project_settlement(
        &self,
        range: &TimeRange,
        location: &str,
    ) -> Vec<HourlySettlement> {
        settle(self.filter(range, location))
    }

    /// Per-month means of settlement, price and generation, ordered by (year, month).
    ///
    /// Months without records are absent from the result.
    pub fn average_monthly_values(&self, range: &TimeRange, location: &str) -> Vec<MonthlyAverage> {
        let records = self.filter(range, location);
        let settlements = settle(records);

        let mut months: BTreeMap<(i32, u32), MonthAccumulator> = BTreeMap::new();
        for (record, hourly) in records.iter().zip(&settlements) {
            months
                .entry((record.timestamp.year(), record.timestamp.month()))
                .or_default()
                .add(hourly.settlement, record.price, record.generation);
        }

        months
            .into_iter()
            .map(|((year, month), acc)| acc.average(year, month))
            .collect()
    }
}

fn settle(records: &[JoinedRecord]) -> Vec<HourlySettlement> {
    records
        .iter()
        .map(|r| HourlySettlement {
            timestamp: r.timestamp,
            settlement: r.settlement(),
        })
        .collect()
}

#[derive(Debug, Default)]
struct MonthAccumulator {
    count: usize,
    settlement: f64,
    price: f64,
    generation: f64,
}

impl MonthAccumulator {
    fn add(&mut self, settlement: f64, price: f64, generation: f64) {
        self.count += 1;
        self.settlement += settlement;
        self.price += price;
        self.generation += generation;
    }

    // Only built from at least one record, so count > 0.
    fn average(&self, year: i32, month: u32) -> MonthlyAverage {
        let n = self.count as f64;
        MonthlyAverage {
            year,
            month,
            settlement: self.settlement / n,
            price: self.price / n,
            generation: self.generation / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, Timelike};

    use super::*;
    use crate::dataset::{GenerationRecord, PriceRecord};

    fn at(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2015, month, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn engine() -> QueryEngine {
        let stamps = [at(1, 1, 0), at(1, 1, 1), at(1, 31, 23), at(2, 1, 0), at(3, 15, 12)];
        let prices = stamps.iter().enumerate().flat_map(|(i, ts)| {
            [
                PriceRecord::new(ts.date(), i64::from(ts.hour()), "HB_HOUSTON", 10.0 + i as f64)
                    .unwrap(),
                PriceRecord::new(ts.date(), i64::from(ts.hour()), "LZ_WEST", 1.0).unwrap(),
            ]
        });
        let generation = stamps
            .iter()
            .enumerate()
            .map(|(i, ts)| GenerationRecord::new(*ts, 2.0 * (i + 1) as f64));
        QueryEngine::new(Arc::new(Dataset::build(prices, generation)))
    }

    #[test]
    fn filter_is_half_open() {
        let engine = engine();
        let range = TimeRange::new(at(1, 1, 1), at(2, 1, 0));
        let stamps: Vec<_> = engine
            .filter(&range, "HB_HOUSTON")
            .iter()
            .map(|r| r.timestamp)
            .collect();
        assert_eq!(stamps, vec![at(1, 1, 1), at(1, 31, 23)]);
    }

    #[test]
    fn filter_unknown_location_is_empty() {
        let engine = engine();
        let range = TimeRange::new(at(1, 1, 0), at(12, 31, 0));
        assert!(engine.filter(&range, "HB_NORTH").is_empty());
    }

    #[test]
    fn filter_reversed_range_is_empty() {
        let engine = engine();
        let range = TimeRange::new(at(3, 1, 0), at(1, 1, 0));
        assert!(engine.filter(&range, "HB_HOUSTON").is_empty());
        assert!(engine.hourly_project_settlement(&range, "HB_HOUSTON").is_empty());
        assert!(engine.average_monthly_values(&range, "HB_HOUSTON").is_empty());
    }

    #[test]
    fn hourly_settlement_multiplies_price_and_generation() {
        let engine = engine();
        let range = TimeRange::new(at(1, 1, 0), at(1, 1, 2));
        let rows = engine.hourly_project_settlement(&range, "HB_HOUSTON");
        assert_eq!(
            rows,
            vec![
                HourlySettlement {
                    timestamp: at(1, 1, 0),
                    settlement: 10.0 * 2.0,
                },
                HourlySettlement {
                    timestamp: at(1, 1, 1),
                    settlement: 11.0 * 4.0,
                },
            ]
        );
    }

    #[test]
    fn monthly_averages_group_by_calendar_month() {
        let engine = engine();
        let range = TimeRange::new(at(1, 1, 0), at(12, 1, 0));
        let months = engine.average_monthly_values(&range, "HB_HOUSTON");

        assert_eq!(months.len(), 3);
        assert_eq!((months[0].year, months[0].month), (2015, 1));
        assert_eq!((months[1].year, months[1].month), (2015, 2));
        assert_eq!((months[2].year, months[2].month), (2015, 3));

        // January: prices 10, 11, 12; generation 2, 4, 6
        let jan = months[0];
        assert!((jan.price - 11.0).abs() < 1e-9);
        assert!((jan.generation - 4.0).abs() < 1e-9);
        assert!((jan.settlement - (20.0 + 44.0 + 72.0) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn monthly_average_of_one_record_equals_record() {
        let engine = engine();
        let range = TimeRange::new(at(3, 1, 0), at(4, 1, 0));
        let months = engine.average_monthly_values(&range, "HB_HOUSTON");
        assert_eq!(
            months,
            vec![MonthlyAverage {
                year: 2015,
                month: 3,
                settlement: 14.0 * 10.0,
                price: 14.0,
                generation: 10.0,
            }]
        );
    }

    #[test]
    fn queries_are_idempotent() {
        let engine = engine();
        let range = TimeRange::new(at(1, 1, 0), at(12, 1, 0));
        assert_eq!(
            engine.hourly_project_settlement(&range, "LZ_WEST"),
            engine.hourly_project_settlement(&range, "LZ_WEST")
        );
        assert_eq!(
            engine.average_monthly_values(&range, "LZ_WEST"),
            engine.average_monthly_values(&range, "LZ_WEST")
        );
    }
}
