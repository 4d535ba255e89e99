/// Navigation state definitions for a browsing session
///
/// A session starts `Idle`, moves through `Navigating` on every page load or
/// history step, and lands in `Loaded` or `Failed`. `Closed` is terminal.
use std::fmt;

/// Represents the current state of a navigator's page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavState {
    /// Session opened, nothing loaded yet
    Idle,

    /// A navigation or history step is in flight
    Navigating,

    /// The last navigation settled; the page can be evaluated
    Loaded,

    /// The last navigation timed out or errored
    Failed,

    /// The session has been closed
    Closed,
}

impl NavState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true if the page holds a settled document
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// A failed navigation does not poison the session: the next request may
    /// start from `Failed` just as from `Loaded`.
    pub fn can_transition_to(&self, next: NavState) -> bool {
        match (self, next) {
            (Self::Closed, _) => false,
            (_, Self::Closed) => true,
            (Self::Idle | Self::Loaded | Self::Failed, Self::Navigating) => true,
            (Self::Navigating, Self::Loaded | Self::Failed) => true,
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Navigating => "navigating",
            Self::Loaded => "loaded",
            Self::Failed => "failed",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for NavState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
