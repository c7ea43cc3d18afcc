//! Sink trait and error types
//!
//! This module defines the trait interface for record sinks and the errors
//! they report.

use crate::scrape::BusinessRecord;
use thiserror::Error;

/// Errors that can occur during sink operations
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sink for {0} is closed")]
    Closed(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Append-only destination for business records
///
/// Rows keep the order they were appended in. Implementations never reorder
/// or deduplicate, and assume they are the only writer of their target.
pub trait RecordSink {
    /// Appends one record after all existing rows
    fn append(&mut self, record: &BusinessRecord) -> SinkResult<()>;

    /// Flushes and finalizes the sink
    ///
    /// Calling it again is a no-op. Appending after close fails with
    /// `SinkError::Closed`.
    fn close(&mut self) -> SinkResult<()>;

    /// Number of rows appended through this handle
    fn rows_appended(&self) -> u64;
}
