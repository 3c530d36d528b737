//! Parquet reader for the settlement price table.

use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::debug;

use super::LoadError;
use super::timestamps::parse_date;
use crate::dataset::{PriceRecord, SchemaError};

pub const DELIVERY_DATE: &str = "Delivery Date";
pub const DELIVERY_HOUR: &str = "Delivery Hour";
pub const SETTLEMENT_POINT_NAME: &str = "Settlement Point Name";
pub const SETTLEMENT_POINT_PRICE: &str = "Settlement Point Price";
pub const SETTLEMENT_POINT_TYPE: &str = "Settlement Point Type";

/// Reads every price row of a parquet file, in file order.
///
/// Column types are normalized before reading: the delivery date may be
/// stored as text or as a date, the hour and the price as any numeric type.
/// Other columns, `Delivery Interval` included, are ignored.
///
/// # Errors
///
/// Returns a `LoadError` if the file cannot be decoded or a required column
/// is missing, null or unparseable.
pub fn read_prices_parquet(path: &Path) -> Result<Vec<PriceRecord>, LoadError> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut records = Vec::new();
    for batch in reader {
        let batch = batch?;
        debug!(rows = batch.num_rows(), "read price batch");
        read_price_batch(&batch, &mut records)?;
    }
    Ok(records)
}

/// Appends the rows of one record batch to `out`.
///
/// Row numbers in errors continue from `out.len()`.
///
/// # Errors
///
/// Returns a `SchemaError` for a missing, null or unparseable required value.
pub fn read_price_batch(batch: &RecordBatch, out: &mut Vec<PriceRecord>) -> Result<(), SchemaError> {
    let dates = column_as(batch, DELIVERY_DATE, &DataType::Utf8)?;
    let first_row = out.len();
    let hours = hour_column(batch, first_row)?;
    let names = column_as(batch, SETTLEMENT_POINT_NAME, &DataType::Utf8)?;
    let prices = column_as(batch, SETTLEMENT_POINT_PRICE, &DataType::Float64)?;
    let types = optional_column_as(batch, SETTLEMENT_POINT_TYPE, &DataType::Utf8)?;

    let dates = downcast::<StringArray>(&dates, DELIVERY_DATE)?;
    let hours = downcast::<Int64Array>(&hours, DELIVERY_HOUR)?;
    let names = downcast::<StringArray>(&names, SETTLEMENT_POINT_NAME)?;
    let prices = downcast::<Float64Array>(&prices, SETTLEMENT_POINT_PRICE)?;
    let types = types
        .as_ref()
        .map(|t| downcast::<StringArray>(t, SETTLEMENT_POINT_TYPE))
        .transpose()?;

    out.reserve(batch.num_rows());
    for i in 0..batch.num_rows() {
        let row = first_row + i;
        require(dates, i, row, DELIVERY_DATE)?;
        require(hours, i, row, DELIVERY_HOUR)?;
        require(names, i, row, SETTLEMENT_POINT_NAME)?;
        require(prices, i, row, SETTLEMENT_POINT_PRICE)?;

        let date_text = dates.value(i);
        let date = parse_date(date_text).ok_or_else(|| {
            SchemaError::invalid(row, DELIVERY_DATE, format!("unrecognized date \"{date_text}\""))
        })?;
        let mut record = PriceRecord::new(date, hours.value(i), names.value(i), prices.value(i))
            .map_err(|e| SchemaError::invalid(row, DELIVERY_HOUR, e.to_string()))?;
        if let Some(types) = types.filter(|t| t.is_valid(i)) {
            record = record.with_point_type(types.value(i));
        }
        out.push(record);
    }
    Ok(())
}

/// The delivery hour column as `Int64`.
///
/// Floating-point hours must be whole and non-negative; the cast alone would
/// truncate them.
fn hour_column(batch: &RecordBatch, first_row: usize) -> Result<ArrayRef, SchemaError> {
    let is_floating = batch
        .column_by_name(DELIVERY_HOUR)
        .is_some_and(|c| c.data_type().is_floating());
    if is_floating {
        let floats = column_as(batch, DELIVERY_HOUR, &DataType::Float64)?;
        let floats = downcast::<Float64Array>(&floats, DELIVERY_HOUR)?;
        for (i, hour) in floats.iter().enumerate() {
            if let Some(hour) = hour.filter(|h| h.fract() != 0.0 || *h < 0.0) {
                return Err(SchemaError::invalid(
                    first_row + i,
                    DELIVERY_HOUR,
                    format!("delivery hour {hour} is not a whole hour in [0, 24]"),
                ));
            }
        }
    }
    column_as(batch, DELIVERY_HOUR, &DataType::Int64)
}

fn column_as(batch: &RecordBatch, name: &str, to: &DataType) -> Result<ArrayRef, SchemaError> {
    optional_column_as(batch, name, to)?.ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

fn optional_column_as(
    batch: &RecordBatch,
    name: &str,
    to: &DataType,
) -> Result<Option<ArrayRef>, SchemaError> {
    let Some(column) = batch.column_by_name(name) else {
        return Ok(None);
    };
    cast(column.as_ref(), to).map(Some).map_err(|e| SchemaError::UnexpectedType {
        column: name.to_string(),
        data_type: column.data_type().to_string(),
        message: e.to_string(),
    })
}

fn downcast<'a, T: Array + 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T, SchemaError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| SchemaError::UnexpectedType {
            column: name.to_string(),
            data_type: array.data_type().to_string(),
            message: "cast produced an unexpected array type".to_string(),
        })
}

fn require(array: &dyn Array, i: usize, row: usize, name: &str) -> Result<(), SchemaError> {
    if array.is_null(i) {
        Err(SchemaError::invalid(row, name, "missing value"))
    } else {
        Ok(())
    }
}
