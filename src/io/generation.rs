//! CSV reader for the modeled generation table.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use super::LoadError;
use super::timestamps::parse_timestamp;
use crate::dataset::{GenerationRecord, SchemaError};

pub const TIME: &str = "time";
pub const GENERATION: &str = "generation";

/// Reads the generation CSV at `path`.
///
/// # Errors
///
/// Returns a `LoadError` if the file cannot be read or does not match the
/// `time,generation` schema.
pub fn read_generation_csv(path: &Path) -> Result<Vec<GenerationRecord>, LoadError> {
    let file = File::open(path)?;
    read_generation(file)
}

/// Reads generation rows from any CSV source, in input order.
///
/// Columns are located by header name; extra columns (a leading index, for
/// example) are ignored. Timestamps are truncated to the hour.
///
/// # Errors
///
/// Returns a `LoadError` if the CSV is malformed, a required column is
/// missing, or a cell cannot be parsed.
pub fn read_generation(reader: impl Read) -> Result<Vec<GenerationRecord>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let time_idx = column_index(&headers, TIME)?;
    let generation_idx = column_index(&headers, GENERATION)?;

    let mut records = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result?;
        let time_text = cell(&record, time_idx, row, TIME)?;
        let generation_text = cell(&record, generation_idx, row, GENERATION)?;

        let timestamp = parse_timestamp(time_text).ok_or_else(|| {
            SchemaError::invalid(row, TIME, format!("unrecognized timestamp \"{time_text}\""))
        })?;
        let generation: f64 = generation_text.parse().map_err(|e| {
            SchemaError::invalid(row, GENERATION, format!("\"{generation_text}\": {e}"))
        })?;

        records.push(GenerationRecord::new(timestamp, generation));
    }
    Ok(records)
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize, SchemaError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
}

fn cell<'a>(
    record: &'a StringRecord,
    idx: usize,
    row: usize,
    name: &str,
) -> Result<&'a str, SchemaError> {
    record
        .get(idx)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| SchemaError::invalid(row, name, "missing value"))
}
