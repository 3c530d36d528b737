//! CSV export for query results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::query::{HourlySettlement, MonthlyAverage};

/// Column header for hourly settlement export.
pub const HOURLY_HEADER: &str = "time,hourly_project_settlement";

/// Column header for monthly average export.
pub const MONTHLY_HEADER: &str =
    "year,month,hourly_project_settlement,settlement_point_price,generation";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exports hourly settlements to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_hourly_csv(rows: &[HourlySettlement], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_hourly_csv(rows, io::BufWriter::new(file))
}

/// Writes hourly settlements as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_hourly_csv(rows: &[HourlySettlement], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HOURLY_HEADER.split(','))?;

    for r in rows {
        wtr.write_record(&[
            r.timestamp.format(TIME_FORMAT).to_string(),
            format!("{:.6}", r.settlement),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports monthly averages to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_monthly_csv(rows: &[MonthlyAverage], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_monthly_csv(rows, io::BufWriter::new(file))
}

/// Writes monthly averages as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_monthly_csv(rows: &[MonthlyAverage], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(MONTHLY_HEADER.split(','))?;

    for r in rows {
        wtr.write_record(&[
            r.year.to_string(),
            r.month.to_string(),
            format!("{:.6}", r.settlement),
            format!("{:.6}", r.price),
            format!("{:.6}", r.generation),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
