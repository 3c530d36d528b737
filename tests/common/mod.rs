//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use parquet::arrow::ArrowWriter;

use settlement_query::dataset::{Dataset, GenerationRecord, PriceRecord};
use settlement_query::query::QueryEngine;

/// 2015-01-01T05:00:00Z in epoch milliseconds.
pub const START_2015_MS: i64 = 1_420_088_400_000;
/// 2018-01-01T05:00:00Z in epoch milliseconds.
pub const END_2017_MS: i64 = 1_514_782_800_000;

/// Every `GENERATION_GAP_EVERY`-th hour of 2015 has no generation.
pub const GENERATION_GAP_EVERY: usize = 1000;

/// Every hour of calendar year 2015, in order.
pub fn hours_of_2015() -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..365 * 24).map(|h| start + TimeDelta::hours(h)).collect()
}

fn price_for(ts: &NaiveDateTime) -> f64 {
    20.0 + f64::from(ts.hour()) + f64::from(ts.month()) / 10.0
}

/// Price rows for 2015.
///
/// `HB_HOUSTON` appears twice per hour (hub `HU` first, then `SH` with a
/// price 100 higher), `LZ_WEST` once per hour except for `skip_months`.
/// A trailing hour-24 row for 2015-12-31 rolls into 2016.
pub fn price_rows(lz_west_skip_months: &[u32]) -> Vec<PriceRecord> {
    let mut rows = Vec::new();
    for ts in hours_of_2015() {
        let hour = i64::from(ts.hour());
        let p = price_for(&ts);
        rows.push(
            PriceRecord::new(ts.date(), hour, "HB_HOUSTON", p)
                .unwrap()
                .with_point_type("HU"),
        );
        rows.push(
            PriceRecord::new(ts.date(), hour, "HB_HOUSTON", p + 100.0)
                .unwrap()
                .with_point_type("SH"),
        );
        if !lz_west_skip_months.contains(&ts.month()) {
            rows.push(PriceRecord::new(ts.date(), hour, "LZ_WEST", p / 2.0).unwrap());
        }
    }
    rows.push(
        PriceRecord::new(NaiveDate::from_ymd_opt(2015, 12, 31).unwrap(), 24, "HB_HOUSTON", 1.0)
            .unwrap(),
    );
    rows
}

/// Generation rows for 2015 plus 2016-01-01 00:00, with periodic gaps.
pub fn generation_rows() -> Vec<GenerationRecord> {
    let mut hours = hours_of_2015();
    hours.push(
        NaiveDate::from_ymd_opt(2016, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap(),
    );
    hours
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % GENERATION_GAP_EVERY != GENERATION_GAP_EVERY - 1)
        .map(|(i, ts)| GenerationRecord::new(ts, (i % 10) as f64 + 1.0))
        .collect()
}

/// Dataset for 2015 with every month present for both locations.
pub fn full_year_dataset() -> Dataset {
    Dataset::build(price_rows(&[]), generation_rows())
}

/// Query engine over [`full_year_dataset`].
pub fn full_year_engine() -> QueryEngine {
    QueryEngine::new(Arc::new(full_year_dataset()))
}

/// One raw price row as it appears in the parquet file.
pub struct RawPrice<'a> {
    pub date: &'a str,
    pub hour: i64,
    pub interval: i64,
    pub name: &'a str,
    pub point_type: &'a str,
    pub price: f64,
}

/// Writes price rows to a parquet file with the full source schema.
pub fn write_prices_parquet(path: &Path, rows: &[RawPrice<'_>]) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Delivery Date", DataType::Utf8, false),
        Field::new("Delivery Hour", DataType::Int64, false),
        Field::new("Delivery Interval", DataType::Int64, false),
        Field::new("Settlement Point Name", DataType::Utf8, false),
        Field::new("Settlement Point Type", DataType::Utf8, false),
        Field::new("Settlement Point Price", DataType::Float64, false),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(rows.iter().map(|r| r.date).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.hour).collect::<Vec<_>>())),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.interval).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.name).collect::<Vec<_>>())),
        Arc::new(StringArray::from(rows.iter().map(|r| r.point_type).collect::<Vec<_>>())),
        Arc::new(Float64Array::from(rows.iter().map(|r| r.price).collect::<Vec<_>>())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

    let file = File::create(path).unwrap();
    let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();
}

/// Small price table: two hours for two locations, the first hour split into
/// two 15-minute intervals and two settlement point types.
pub fn small_raw_prices() -> Vec<RawPrice<'static>> {
    vec![
        RawPrice {
            date: "01/01/2015",
            hour: 5,
            interval: 1,
            name: "HB_HOUSTON",
            point_type: "HU",
            price: 20.0,
        },
        RawPrice {
            date: "01/01/2015",
            hour: 5,
            interval: 2,
            name: "HB_HOUSTON",
            point_type: "HU",
            price: 22.0,
        },
        RawPrice {
            date: "01/01/2015",
            hour: 5,
            interval: 1,
            name: "HB_HOUSTON",
            point_type: "SH",
            price: 99.0,
        },
        RawPrice {
            date: "01/01/2015",
            hour: 5,
            interval: 1,
            name: "LZ_WEST",
            point_type: "LZ",
            price: 10.0,
        },
        RawPrice {
            date: "01/01/2015",
            hour: 6,
            interval: 1,
            name: "HB_HOUSTON",
            point_type: "HU",
            price: 30.0,
        },
        RawPrice {
            date: "02/01/2015",
            hour: 24,
            interval: 1,
            name: "HB_HOUSTON",
            point_type: "HU",
            price: 40.0,
        },
    ]
}

/// Generation CSV matching [`small_raw_prices`], with a leading index column.
pub const SMALL_GENERATION_CSV: &str = "\
,time,generation
0,2015-01-01 05:00:00,2.0
1,2015-01-01 06:00:00,3.0
2,2015-02-02 00:00:00,4.0
3,2015-03-01 00:00:00,5.0
";
