//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: the scrape state machine (initializing, paging, extracting, finalizing, ...)
//! - `PageCursor`: position within the listing pages and row ID assignment
//! - `Progress`: the view of a run published to observers
//! - `CancelHandle`: cooperative cancellation between cards

mod cursor;
mod run_state;

// Re-export main types
pub use cursor::{CancelHandle, PageCursor, Progress};
pub use run_state::RunState;
