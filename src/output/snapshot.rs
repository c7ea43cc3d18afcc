//! Immutable, in-memory view of a sink file
//!
//! The file is read once; rankings are computed from that copy and never
//! observe rows appended afterwards.

use crate::output::score::parse_score;
use crate::output::ReportResult;
use crate::scrape::BusinessRecord;
use crate::storage::read_records;
use crate::UNKNOWN;
use std::collections::HashMap;
use std::path::Path;

/// A record together with its parsed rating
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecord {
    pub record: BusinessRecord,
    pub trust_score: f64,
    pub reviews: f64,
}

impl ScoredRecord {
    pub fn new(record: BusinessRecord) -> Self {
        let (trust_score, reviews) = parse_score(&record.rating_summary);
        Self {
            record,
            trust_score,
            reviews,
        }
    }
}

/// Snapshot of every row in a sink file, in file order
#[derive(Debug, Clone, Default)]
pub struct TableSnapshot {
    rows: Vec<ScoredRecord>,
}

impl TableSnapshot {
    /// Reads the file at `path`
    pub fn load(path: &Path) -> ReportResult<Self> {
        let records = read_records(path)?;
        tracing::debug!("Loaded {} record(s) from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<BusinessRecord>) -> Self {
        Self {
            rows: records.into_iter().map(ScoredRecord::new).collect(),
        }
    }

    pub fn rows(&self) -> &[ScoredRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The `n` highest trust scores; ties keep file order
    pub fn top_by_trust_score(&self, n: usize) -> Vec<&ScoredRecord> {
        self.top_by(n, |row| row.trust_score)
    }

    /// The `n` largest review counts; ties keep file order
    pub fn top_by_reviews(&self, n: usize) -> Vec<&ScoredRecord> {
        self.top_by(n, |row| row.reviews)
    }

    /// The `n` locations with the most businesses, `Unknown` excluded
    pub fn top_locations(&self, n: usize) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for row in &self.rows {
            let location = row.record.location.as_str();
            if location == UNKNOWN {
                continue;
            }
            match index.get(location) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(location, counts.len());
                    counts.push((location.to_string(), 1));
                }
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(n);
        counts
    }

    /// Mean trust score over rows that have a rating
    pub fn average_trust_score(&self) -> Option<f64> {
        let rated: Vec<f64> = self
            .rows
            .iter()
            .filter(|row| row.reviews > 0.0)
            .map(|row| row.trust_score)
            .collect();

        if rated.is_empty() {
            None
        } else {
            Some(rated.iter().sum::<f64>() / rated.len() as f64)
        }
    }

    pub fn total_reviews(&self) -> f64 {
        self.rows.iter().map(|row| row.reviews).sum()
    }

    fn top_by(&self, n: usize, key: impl Fn(&ScoredRecord) -> f64) -> Vec<&ScoredRecord> {
        let mut rows: Vec<&ScoredRecord> = self.rows.iter().collect();
        rows.sort_by(|a, b| key(b).total_cmp(&key(a)));
        rows.truncate(n);
        rows
    }
}
