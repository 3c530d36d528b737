//! Joined price/generation dataset.
//!
//! The dataset is assembled once from the price and generation tables and
//! shared read-only afterwards.

pub mod records;
pub mod table;

pub use records::{GenerationRecord, JoinedRecord, PriceRecord, SchemaError};
pub use table::{BuildStats, Dataset};
