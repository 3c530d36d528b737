//! Source table readers and CSV export of query results.

pub mod export;
pub mod generation;
pub mod prices;
pub mod timestamps;

use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use thiserror::Error;
use tracing::info;

use crate::dataset::{Dataset, SchemaError};

/// Failure to load a source table. Always fatal at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A source file does not exist.
    #[error("data file not found: {}", .0.display())]
    MissingData(PathBuf),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Parquet(#[from] ParquetError),
    #[error(transparent)]
    Arrow(#[from] ArrowError),
    /// Wraps another load error with the file it came from.
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        source: Box<LoadError>,
    },
}

impl LoadError {
    fn in_file(self, path: &Path) -> Self {
        match self {
            Self::MissingData(_) | Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.to_path_buf(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, without file context.
    pub fn root(&self) -> &Self {
        match self {
            Self::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Loads both source tables and joins them.
///
/// # Errors
///
/// Returns [`LoadError::MissingData`] if either file is absent, or the first
/// read or schema error encountered.
pub fn load_dataset(prices_path: &Path, generation_path: &Path) -> Result<Dataset, LoadError> {
    for path in [prices_path, generation_path] {
        if !path.is_file() {
            return Err(LoadError::MissingData(path.to_path_buf()));
        }
    }

    let prices = prices::read_prices_parquet(prices_path).map_err(|e| e.in_file(prices_path))?;
    info!(path = %prices_path.display(), rows = prices.len(), "loaded prices");

    let generation =
        generation::read_generation_csv(generation_path).map_err(|e| e.in_file(generation_path))?;
    info!(path = %generation_path.display(), rows = generation.len(), "loaded generation");

    Ok(Dataset::build(prices, generation))
}
