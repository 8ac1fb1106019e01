/// Run lifecycle definitions for the harvest orchestrator
use std::fmt;

/// Why a run stopped paging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    // ===== Normal Termination =====
    /// A listing page rendered no items
    EndOfListing { page: u32 },

    /// The configured page ceiling was reached
    PageCeiling { max_pages: u32 },

    // ===== Failed Termination =====
    /// A listing page could not be loaded and the policy is to abort
    PageLoadFailure { page: u32, error: String },

    /// The maximum run duration elapsed
    DeadlineExceeded,

    /// Cancellation was requested from outside
    Cancelled,
}

impl RunOutcome {
    /// Returns true if the run ended without exhausting the listing normally
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::PageLoadFailure { .. } | Self::DeadlineExceeded | Self::Cancelled
        )
    }

    /// Short machine-friendly label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EndOfListing { .. } => "end_of_listing",
            Self::PageCeiling { .. } => "page_ceiling",
            Self::PageLoadFailure { .. } => "page_load_failure",
            Self::DeadlineExceeded => "deadline_exceeded",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfListing { page } => write!(f, "listing exhausted at page {}", page),
            Self::PageCeiling { max_pages } => write!(f, "page ceiling of {} reached", max_pages),
            Self::PageLoadFailure { page, error } => {
                write!(f, "page {} failed to load: {}", page, error)
            }
            Self::DeadlineExceeded => write!(f, "run deadline exceeded"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Lifecycle phase of a harvest run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunPhase {
    /// Created, nothing navigated yet
    #[default]
    Init,

    /// Working on the given listing page
    PagingLoop { page: u32 },

    /// Finished; terminal
    Done(RunOutcome),
}

impl RunPhase {
    /// Returns true once the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Checks whether moving from `self` to `next` is allowed
    ///
    /// Pages are visited strictly in order starting at 1, and `Done` can be
    /// reached from any non-terminal phase.
    pub fn can_transition_to(&self, next: &RunPhase) -> bool {
        match (self, next) {
            (Self::Init, Self::PagingLoop { page }) => *page == 1,
            (Self::PagingLoop { page: current }, Self::PagingLoop { page }) => {
                *page == current + 1
            }
            (Self::Init | Self::PagingLoop { .. }, Self::Done(_)) => true,
            _ => false,
        }
    }

    /// Moves to `next`, logging the transition
    ///
    /// An invalid transition is a programming error; it is logged and the
    /// phase is left unchanged.
    pub fn advance(&mut self, next: RunPhase) -> bool {
        if !self.can_transition_to(&next) {
            tracing::error!("Invalid run transition: {:?} -> {:?}", self, next);
            debug_assert!(false, "invalid run transition");
            return false;
        }

        tracing::trace!("Run transition: {:?} -> {:?}", self, next);
        *self = next;
        true
    }

    /// The outcome, once terminal
    pub fn outcome(&self) -> Option<&RunOutcome> {
        match self {
            Self::Done(outcome) => Some(outcome),
            _ => None,
        }
    }
}
