//! Trust-Scout: a business-directory scraper for review aggregators
//!
//! This crate walks the paginated category listings of a review site,
//! extracts one record per business card (name, rating, location, contact
//! details) and appends them incrementally to a CSV file.

pub mod config;
pub mod output;
pub mod scrape;
pub mod session;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Trust-Scout operations
///
/// Only failures that end a run surface here. Missing DOM elements, missing
/// fields and failed detail-page requests are absorbed where they happen and
/// show up as sentinel values in the output instead.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Sink error: {0}")]
    Sink(#[from] storage::SinkError),

    #[error("Run log error: {0}")]
    RunLog(#[from] storage::RunLogError),

    #[error("Report error: {0}")]
    Report(#[from] output::ReportError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Category must not be empty")]
    EmptyCategory,

    #[error("Landing page for category '{0}' declared zero pages")]
    ZeroPages(String),

    #[error("Cannot open output file {path}: {message}")]
    OutputPath { path: String, message: String },
}

/// Result type alias for Trust-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Placeholder written for any field that could not be extracted
pub const UNKNOWN: &str = "Unknown";

// Re-export commonly used types
pub use config::Config;
pub use scrape::{BusinessRecord, Coordinator, RunOutcome, RunSummary};
pub use state::{PageCursor, Progress, RunState};
