mod loader;
pub mod similarity;
pub mod tokenize;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use ruta_core::models::{FareRecord, FareSummaryRow};
use ruta_core::text::normalize;
use ruta_core::MatchConfig;
use serde::Serialize;

pub use loader::{load_records, TableError};
pub use similarity::{phrase_score, set_covers, tokens_match};
pub use tokenize::tokenize;

/// What the resolver decided for one extracted trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Matched { rows: Vec<FareSummaryRow> },
    NeedsConfirmation { candidate: String },
    NoMatch,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableStats {
    pub records: usize,
    pub localities: usize,
    pub destinations: usize,
}

/// Immutable fare-table snapshot with its locality index, built once at
/// load time. Queries only read it; refreshing the source data means
/// building a whole new snapshot and swapping it in.
#[derive(Debug)]
pub struct FareTable {
    records: Vec<FareRecord>,
    /// Locality string -> precomputed token set.
    index: HashMap<String, HashSet<String>>,
    /// Distinct destination strings (raw and normalized), first-seen order.
    destinations: Vec<(String, String)>,
}

impl FareTable {
    pub fn from_records(records: Vec<FareRecord>, config: &MatchConfig) -> Self {
        let mut index = HashMap::new();
        let mut destinations: Vec<(String, String)> = Vec::new();

        for record in &records {
            for locality in [&record.origin, &record.destination] {
                index
                    .entry(locality.clone())
                    .or_insert_with(|| tokenize(locality, &config.noise_words));
            }
            if !destinations.iter().any(|(raw, _)| raw == &record.destination) {
                destinations.push((record.destination.clone(), normalize(&record.destination)));
            }
        }

        Self {
            records,
            index,
            destinations,
        }
    }

    pub fn from_csv_path(
        path: impl AsRef<Path>,
        config: &MatchConfig,
    ) -> Result<Self, TableError> {
        Ok(Self::from_records(load_records(path)?, config))
    }

    pub fn records(&self) -> &[FareRecord] {
        &self.records
    }

    pub fn stats(&self) -> TableStats {
        TableStats {
            records: self.records.len(),
            localities: self.index.len(),
            destinations: self.destinations.len(),
        }
    }

    /// Filters the table by fuzzy origin/destination match and aggregates
    /// the survivors per (operator, mode). Token-set covering runs first;
    /// when it yields nothing, a whole-string pass over distinct
    /// destination strings decides between a confident match, a single
    /// candidate worth confirming, and no match at all.
    pub fn resolve(&self, origin: &str, destination: &str, config: &MatchConfig) -> Resolution {
        let threshold = config.token_threshold;

        let mut origin_tokens = tokenize(origin, &config.noise_words);
        if origin_tokens.is_empty() {
            // the extractor always supplies an origin; pure-noise input
            // falls back to the home city rather than matching everything
            origin_tokens = tokenize(&config.home_city, &config.noise_words);
        }
        let destination_tokens = tokenize(destination, &config.noise_words);
        if destination_tokens.is_empty() {
            // nothing but noise words: unidentifiable, never match-everything
            return Resolution::NoMatch;
        }

        let empty = HashSet::new();
        let row_tokens = |locality: &str| self.index.get(locality).unwrap_or(&empty);

        let candidates: Vec<&FareRecord> = self
            .records
            .iter()
            .filter(|record| {
                set_covers(row_tokens(&record.origin), &origin_tokens, threshold)
                    && set_covers(row_tokens(&record.destination), &destination_tokens, threshold)
            })
            .collect();

        if !candidates.is_empty() {
            return Resolution::Matched {
                rows: aggregate(&candidates),
            };
        }

        self.resolve_by_phrase(destination, config)
    }

    /// Whole-string fallback on the destination alone; origin is ignored
    /// because fallback queries are single-leg trips from the home city.
    fn resolve_by_phrase(&self, destination: &str, config: &MatchConfig) -> Resolution {
        let query = normalize(destination);
        if query.is_empty() {
            return Resolution::NoMatch;
        }

        let mut best: Option<(f64, &str)> = None;
        let mut suggestable = 0usize;

        for (raw, normalized) in &self.destinations {
            let score = phrase_score(&query, normalized);
            if score < config.suggest_threshold {
                continue;
            }
            suggestable += 1;
            if best.map_or(true, |(top, _)| score > top) {
                best = Some((score, raw.as_str()));
            }
        }

        match best {
            Some((score, raw)) if score >= config.confident_threshold => {
                let candidates: Vec<&FareRecord> = self
                    .records
                    .iter()
                    .filter(|record| record.destination == raw)
                    .collect();
                Resolution::Matched {
                    rows: aggregate(&candidates),
                }
            }
            Some((_, raw)) if suggestable == 1 => Resolution::NeedsConfirmation {
                candidate: raw.to_string(),
            },
            _ => Resolution::NoMatch,
        }
    }
}

fn aggregate(records: &[&FareRecord]) -> Vec<FareSummaryRow> {
    let mut groups: BTreeMap<(String, String), (Decimal, Decimal)> = BTreeMap::new();

    for record in records {
        let key = (record.operator.clone(), record.mode.clone());
        groups
            .entry(key)
            .and_modify(|(min, max)| {
                *min = (*min).min(record.fare);
                *max = (*max).max(record.fare);
            })
            .or_insert((record.fare, record.fare));
    }

    let mut rows: Vec<FareSummaryRow> = groups
        .into_iter()
        .map(|((operator, mode), (fare_min, fare_max))| FareSummaryRow {
            operator,
            mode,
            fare_min,
            fare_max,
        })
        .collect();

    rows.sort_by(|a, b| {
        a.fare_min
            .cmp(&b.fare_min)
            .then_with(|| a.operator.cmp(&b.operator))
    });

    rows
}
