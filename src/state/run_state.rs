/// Run state definitions for the scrape state machine
///
/// A run moves `Initializing → Paging → Extracting(p)… → Finalizing → Closed`.
/// `Failed` is reachable from every non-terminal state.
use std::fmt;

/// Represents the current state of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Acquiring the session, opening the sink and counting pages
    Initializing,

    /// Page count known, positioning the cursor on the first page
    Paging,

    /// Extracting the cards of the given 0-indexed page
    Extracting(u32),

    /// Closing the sink and releasing the session
    Finalizing,

    // ===== Terminal States =====
    /// Run finished and all handles are released
    Closed,

    /// Run aborted by a session or configuration failure
    Failed,
}

impl RunState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (Self::Closed | Self::Failed, _) => false,
            (_, Self::Failed) => true,
            (Self::Initializing, Self::Paging) => true,
            (Self::Paging, Self::Extracting(0)) => true,
            (Self::Extracting(p), Self::Extracting(q)) => q == p + 1,
            (Self::Extracting(_), Self::Finalizing) => true,
            (Self::Finalizing, Self::Closed) => true,
            _ => false,
        }
    }

    /// The page being extracted, if any
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Extracting(p) => Some(*p),
            _ => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => write!(f, "initializing"),
            Self::Paging => write!(f, "paging"),
            Self::Extracting(p) => write!(f, "extracting page {}", p + 1),
            Self::Finalizing => write!(f, "finalizing"),
            Self::Closed => write!(f, "closed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
