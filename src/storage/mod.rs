//! Storage module for persisting scrape output
//!
//! This module handles:
//! - The append-only CSV sink records are written to
//! - Reading sink files back
//! - The SQLite run log

mod csv_sink;
mod run_log;
mod schema;
mod traits;

pub use csv_sink::{read_records, CsvSink, HEADER};
pub use run_log::{RunLog, RunLogError, RunLogResult};
pub use traits::{RecordSink, SinkError, SinkResult};

use crate::scrape::RunOutcome;

/// Represents a scrape run in the run log
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub category: String,
    pub output_path: String,
    pub config_hash: String,
    pub status: RunStatus,
    pub rows_written: u64,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Exhausted,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Exhausted => "exhausted",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "exhausted" => Some(Self::Exhausted),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl From<RunOutcome> for RunStatus {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => Self::Completed,
            RunOutcome::Exhausted => Self::Exhausted,
            RunOutcome::Cancelled => Self::Cancelled,
        }
    }
}
