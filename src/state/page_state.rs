/// Page state definitions for tracking crawl progress
///
/// A page starts `Pending`, is rendered, harvested, and ends either
/// `Persisted` or `Failed`. Failure is reachable from every active state.
use crate::HarvestError;
use std::fmt;

/// Represents the current state of a page in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page is waiting to be processed
    Pending,

    /// Page is loading in the browser
    Rendering,

    /// Page images are being fetched and judged
    Harvesting,

    // ===== Terminal States =====
    /// Accepted images (possibly none) were written and the title recorded
    Persisted,

    /// Rendering or persisting failed; the crawl moves on
    Failed,
}

impl PageState {
    /// Returns true if no further processing happens for the page
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted | Self::Failed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Persisted)
    }

    /// Whether moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Rendering)
                | (Self::Rendering, Self::Harvesting)
                | (Self::Harvesting, Self::Persisted)
                | (Self::Pending | Self::Rendering | Self::Harvesting, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rendering => "rendering",
            Self::Harvesting => "harvesting",
            Self::Persisted => "persisted",
            Self::Failed => "failed",
        }
    }

    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Pending,
            Self::Rendering,
            Self::Harvesting,
            Self::Persisted,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one page's state through the crawl
#[derive(Debug, Clone)]
pub struct PageProgress {
    index: usize,
    state: PageState,
}

impl PageProgress {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: PageState::Pending,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    /// Moves to `next`, rejecting illegal steps
    pub fn advance(&mut self, next: PageState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!("Page {}: {} -> {}", self.index, self.state, next);
        self.state = next;
        Ok(())
    }

    /// Marks the page failed unless it already reached a terminal state
    pub fn fail(&mut self) {
        if self.state.is_active() {
            self.state = PageState::Failed;
        }
    }
}
