//! Report statistics computed from a table snapshot
//!
//! This module condenses a `TableSnapshot` into the rankings shown by the
//! report and prints them to stdout.

use crate::output::snapshot::TableSnapshot;
use crate::storage::RunRecord;

/// Number of entries in each ranking
pub const TOP_N: usize = 10;

/// Summary of a sink file
#[derive(Debug, Clone, Default)]
pub struct ReportSummary {
    /// File the summary was computed from
    pub source: String,

    /// Total number of rows
    pub total_records: usize,

    /// Rows carrying a real rating (non-zero review count)
    pub rated_records: usize,

    /// Rows with a known location
    pub located_records: usize,

    pub average_trust_score: Option<f64>,

    pub total_reviews: f64,

    /// (company name, trust score)
    pub top_trust_scores: Vec<(String, f64)>,

    /// (company name, review count)
    pub top_reviews: Vec<(String, f64)>,

    /// (location, number of businesses)
    pub top_locations: Vec<(String, usize)>,

    /// Most recent run that wrote to the file, if a run log is kept
    pub last_run: Option<RunRecord>,
}

impl ReportSummary {
    /// Computes the summary of `snapshot`, keeping `top_n` entries per ranking
    pub fn from_snapshot(source: &str, snapshot: &TableSnapshot, top_n: usize) -> Self {
        let rows = snapshot.rows();

        Self {
            source: source.to_string(),
            total_records: rows.len(),
            rated_records: rows.iter().filter(|row| row.reviews > 0.0).count(),
            located_records: rows
                .iter()
                .filter(|row| row.record.location != crate::UNKNOWN)
                .count(),
            average_trust_score: snapshot.average_trust_score(),
            total_reviews: snapshot.total_reviews(),
            top_trust_scores: snapshot
                .top_by_trust_score(top_n)
                .into_iter()
                .map(|row| (row.record.name.clone(), row.trust_score))
                .collect(),
            top_reviews: snapshot
                .top_by_reviews(top_n)
                .into_iter()
                .map(|row| (row.record.name.clone(), row.reviews))
                .collect(),
            top_locations: snapshot.top_locations(top_n),
            last_run: None,
        }
    }

    pub fn with_last_run(mut self, run: Option<RunRecord>) -> Self {
        self.last_run = run;
        self
    }

    /// Share of each top-reviewed company within the top list, in percent
    pub fn review_shares(&self) -> Vec<(String, f64)> {
        let total: f64 = self.top_reviews.iter().map(|(_, reviews)| reviews).sum();
        self.top_reviews
            .iter()
            .map(|(name, reviews)| {
                let share = if total > 0.0 {
                    reviews / total * 100.0
                } else {
                    0.0
                };
                (name.clone(), share)
            })
            .collect()
    }
}

/// Prints a report to stdout in a formatted manner
pub fn print_report(summary: &ReportSummary) {
    println!("=== Company Report: {} ===\n", summary.source);

    println!("Overview:");
    println!("  Companies: {}", summary.total_records);
    println!("  With rating: {}", summary.rated_records);
    println!("  With location: {}", summary.located_records);
    match summary.average_trust_score {
        Some(average) => println!("  Average TrustScore: {:.2}", average),
        None => println!("  Average TrustScore: n/a"),
    }
    println!("  Total reviews: {}", summary.total_reviews);
    println!();

    if !summary.top_trust_scores.is_empty() {
        println!("Top {} by TrustScore:", summary.top_trust_scores.len());
        for (rank, (name, score)) in summary.top_trust_scores.iter().enumerate() {
            println!("  {:>2}. {} ({:.1})", rank + 1, name, score);
        }
        println!();
    }

    if !summary.top_reviews.is_empty() {
        println!("Top {} by reviews:", summary.top_reviews.len());
        for (rank, (name, share)) in summary.review_shares().iter().enumerate() {
            println!(
                "  {:>2}. {} ({} reviews, {:.1}%)",
                rank + 1,
                name,
                summary.top_reviews[rank].1,
                share
            );
        }
        println!();
    }

    if !summary.top_locations.is_empty() {
        println!("Top locations:");
        for (location, count) in &summary.top_locations {
            println!("  {}: {}", location, count);
        }
        println!();
    }

    if let Some(run) = &summary.last_run {
        println!(
            "Last run: #{} {} ({} rows, started {})",
            run.id,
            run.status.to_db_string(),
            run.rows_written,
            run.started_at
        );
    }
}
