//! Output module for reports over scraped data
//!
//! This module handles:
//! - Loading a sink file into an immutable snapshot
//! - Parsing rating summaries into numbers
//! - Ranking companies and locations
//! - Printing reports and exporting them as markdown

mod markdown;
mod score;
mod snapshot;
pub mod stats;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use score::parse_score;
pub use snapshot::{ScoredRecord, TableSnapshot};
pub use stats::{print_report, ReportSummary, TOP_N};

use crate::storage::SinkError;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while building or writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read records: {0}")]
    Sink(#[from] SinkError),
}

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Loads `csv_path` and summarizes it
///
/// # Arguments
///
/// * `csv_path` - The sink file to read
/// * `top_n` - Number of entries per ranking
pub fn load_report(csv_path: &Path, top_n: usize) -> ReportResult<ReportSummary> {
    let snapshot = TableSnapshot::load(csv_path)?;
    Ok(ReportSummary::from_snapshot(
        &csv_path.display().to_string(),
        &snapshot,
        top_n,
    ))
}
