// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Lifecycle of one (zone, provider) pair.
//!
//! ```text
//! init -> listing -> listed -> diffing -> planned -> executing -> done
//!    \________\__________\_________\_________\___________\----> failed
//! ```
//!
//! Any non-terminal state may move to `failed`. Terminal states never move.

use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    Init,
    Listing,
    Listed,
    Diffing,
    Planned,
    Executing,
    Done,
    Failed,
}

impl TaskState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// The state that normally follows this one.
    #[must_use]
    pub fn successor(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Listing),
            Self::Listing => Some(Self::Listed),
            Self::Listed => Some(Self::Diffing),
            Self::Diffing => Some(Self::Planned),
            Self::Planned => Some(Self::Executing),
            Self::Executing => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    #[must_use]
    pub fn can_move_to(self, next: Self) -> bool {
        !self.is_terminal() && (next == Self::Failed || self.successor() == Some(next))
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Init => "init",
            Self::Listing => "listing",
            Self::Listed => "listed",
            Self::Diffing => "diffing",
            Self::Planned => "planned",
            Self::Executing => "executing",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// Tracks and logs the state of one (zone, provider) pair.
#[derive(Debug, Clone)]
pub struct PairTracker {
    zone: String,
    provider: String,
    state: TaskState,
}

impl PairTracker {
    #[must_use]
    pub fn new(zone: &str, provider: &str) -> Self {
        Self {
            zone: zone.to_string(),
            provider: provider.to_string(),
            state: TaskState::Init,
        }
    }

    #[must_use]
    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Move to `next`. Illegal moves are ignored and logged; the tracker
    /// only ever reports, it never drives control flow.
    pub fn advance(&mut self, next: TaskState) {
        if !self.state.can_move_to(next) {
            debug!(
                zone = %self.zone,
                provider = %self.provider,
                from = %self.state,
                to = %next,
                "Ignoring illegal state transition"
            );
            return;
        }
        debug!(
            zone = %self.zone,
            provider = %self.provider,
            from = %self.state,
            to = %next,
            "State transition"
        );
        self.state = next;
    }

    pub fn fail(&mut self) {
        self.advance(TaskState::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = PairTracker::new("example.com", "mem");
        for next in [
            TaskState::Listing,
            TaskState::Listed,
            TaskState::Diffing,
            TaskState::Planned,
            TaskState::Executing,
            TaskState::Done,
        ] {
            tracker.advance(next);
            assert_eq!(tracker.state(), next);
        }
    }

    #[test]
    fn test_skipping_states_is_ignored() {
        let mut tracker = PairTracker::new("example.com", "mem");
        tracker.advance(TaskState::Planned);
        assert_eq!(tracker.state(), TaskState::Init);
    }

    #[test]
    fn test_terminal_states_stick() {
        let mut tracker = PairTracker::new("example.com", "mem");
        tracker.advance(TaskState::Listing);
        tracker.fail();
        tracker.advance(TaskState::Listed);
        tracker.fail();
        assert_eq!(tracker.state(), TaskState::Failed);
        assert!(tracker.state().is_terminal());
    }
}
