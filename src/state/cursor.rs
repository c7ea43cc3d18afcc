use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::state::RunState;

/// Position of a run within the category's listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    /// 0-indexed page currently loaded in the session
    pub current_index: u32,

    /// Page count determined once at session start
    pub total_pages: u32,
}

impl PageCursor {
    pub fn new(total_pages: u32) -> Self {
        Self {
            current_index: 0,
            total_pages,
        }
    }

    /// Returns true when the cursor sits on the last declared page
    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.total_pages
    }

    /// Moves to the next page; returns false if already on the last one
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Row ID for the `local_index`-th card of the current page
    pub fn sequence_id(&self, page_size: u32, local_index: usize) -> u64 {
        u64::from(self.current_index) * u64::from(page_size) + local_index as u64
    }
}

/// Snapshot of a run published to observers (progress bars, UIs)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub state: RunState,
    pub total_pages: u32,
    pub rows_written: u64,
}

impl Progress {
    pub fn new() -> Self {
        Self {
            state: RunState::Initializing,
            total_pages: 0,
            rows_written: 0,
        }
    }

    /// 0-indexed page being extracted, if the run is extracting
    pub fn page(&self) -> Option<u32> {
        self.state.page()
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

/// Cooperative cancellation flag checked between cards
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that the run stop before its next card
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
