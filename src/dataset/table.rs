//! The joined, deduplicated price/generation table.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDateTime;
use tracing::{info, warn};

use super::records::{GenerationRecord, JoinedRecord, PriceRecord};

/// Immutable joined dataset.
///
/// Built once from the two source tables and then only read. Records are
/// grouped per settlement point and sorted by timestamp, so range lookups
/// borrow a contiguous slice.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    by_location: BTreeMap<String, Vec<JoinedRecord>>,
    len: usize,
}

/// Row counts observed while building a [`Dataset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Price rows read.
    pub price_rows: usize,
    /// Generation rows read.
    pub generation_rows: usize,
    /// Generation rows dropped because their hour was already present.
    pub duplicate_generation_hours: usize,
    /// Price rows with no generation for their hour.
    pub unmatched_prices: usize,
    /// Joined rows dropped because their (timestamp, location) was already present.
    pub duplicate_rows: usize,
    /// Rows kept in the dataset.
    pub joined_rows: usize,
}

impl Dataset {
    /// Joins prices with generation on the hour-grain timestamp.
    ///
    /// Inner join: a price row without generation for its hour is dropped.
    /// The first generation value per hour and the first price row per
    /// (timestamp, location), both in input order, win.
    pub fn build<P, G>(prices: P, generation: G) -> Self
    where
        P: IntoIterator<Item = PriceRecord>,
        G: IntoIterator<Item = GenerationRecord>,
    {
        Self::build_with_stats(prices, generation).0
    }

    /// Same as [`Dataset::build`], also returning the row counts.
    pub fn build_with_stats<P, G>(prices: P, generation: G) -> (Self, BuildStats)
    where
        P: IntoIterator<Item = PriceRecord>,
        G: IntoIterator<Item = GenerationRecord>,
    {
        let mut stats = BuildStats::default();

        let mut generation_by_hour: HashMap<NaiveDateTime, f64> = HashMap::new();
        for record in generation {
            stats.generation_rows += 1;
            match generation_by_hour.entry(record.timestamp()) {
                Entry::Vacant(slot) => {
                    slot.insert(record.generation);
                }
                Entry::Occupied(_) => stats.duplicate_generation_hours += 1,
            }
        }

        let mut seen: HashSet<(NaiveDateTime, String)> = HashSet::new();
        let mut by_location: BTreeMap<String, Vec<JoinedRecord>> = BTreeMap::new();
        for price in prices {
            stats.price_rows += 1;
            let timestamp = price.timestamp();
            let Some(&generation) = generation_by_hour.get(&timestamp) else {
                stats.unmatched_prices += 1;
                continue;
            };
            if !seen.insert((timestamp, price.location.clone())) {
                stats.duplicate_rows += 1;
                continue;
            }
            by_location
                .entry(price.location.clone())
                .or_default()
                .push(JoinedRecord {
                    timestamp,
                    location: price.location,
                    price: price.price,
                    generation,
                });
        }

        for records in by_location.values_mut() {
            records.sort_by_key(|r| r.timestamp);
        }
        stats.joined_rows = seen.len();

        if stats.duplicate_generation_hours > 0 {
            warn!(
                count = stats.duplicate_generation_hours,
                "generation table repeats hours, kept first value per hour"
            );
        }
        if stats.duplicate_rows > 0 {
            warn!(
                count = stats.duplicate_rows,
                "dropped duplicate (timestamp, settlement point) rows"
            );
        }
        info!(
            price_rows = stats.price_rows,
            generation_rows = stats.generation_rows,
            unmatched_prices = stats.unmatched_prices,
            joined_rows = stats.joined_rows,
            locations = by_location.len(),
            "dataset built"
        );

        (
            Self {
                by_location,
                len: stats.joined_rows,
            },
            stats,
        )
    }

    /// Total number of joined records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Settlement point names, sorted.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.by_location.keys().map(String::as_str)
    }

    /// All records of one settlement point, sorted by timestamp.
    ///
    /// Unknown locations yield an empty slice.
    pub fn location(&self, location: &str) -> &[JoinedRecord] {
        self.by_location
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every record, grouped by location and sorted by timestamp within a location.
    pub fn records(&self) -> impl Iterator<Item = &JoinedRecord> {
        self.by_location.values().flatten()
    }
}
