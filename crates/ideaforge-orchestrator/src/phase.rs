//! Discussion phases and their legal transitions.
//!
//! ```text
//! Idle -> Kickoff -> Round(1) -> ... -> Round(N) -> FinalValidation
//!      -> FinalSelection -> Visualization -> Completed
//! ```
//!
//! Any non-terminal phase may move to `Failed`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{OrchestratorError, Result};

/// Where a discussion is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionPhase {
    Idle,
    Kickoff,
    /// Exploration round, numbered from 1.
    Round(u32),
    FinalValidation,
    FinalSelection,
    Visualization,
    Completed,
    Failed,
}

impl DiscussionPhase {
    /// Whether no further transitions are allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `to` follows the phase graph.
    pub fn can_advance_to(self, to: DiscussionPhase) -> bool {
        use DiscussionPhase::*;

        if to == Failed {
            return !self.is_terminal();
        }

        match (self, to) {
            (Idle, Kickoff) => true,
            (Kickoff, Round(1)) => true,
            (Round(r), Round(next)) => r.checked_add(1) == Some(next),
            (Round(_), FinalValidation) => true,
            (FinalValidation, FinalSelection) => true,
            (FinalSelection, Visualization) => true,
            (Visualization, Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DiscussionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Kickoff => write!(f, "kickoff"),
            Self::Round(r) => write!(f, "round {}", r),
            Self::FinalValidation => write!(f, "final validation"),
            Self::FinalSelection => write!(f, "final selection"),
            Self::Visualization => write!(f, "visualization"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Current phase plus the path taken to reach it.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    current: DiscussionPhase,
    history: Vec<DiscussionPhase>,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            current: DiscussionPhase::Idle,
            history: vec![DiscussionPhase::Idle],
        }
    }

    pub fn current(&self) -> DiscussionPhase {
        self.current
    }

    /// Every phase entered so far, starting with `Idle`.
    pub fn history(&self) -> &[DiscussionPhase] {
        &self.history
    }

    /// Move to `to`, rejecting transitions outside the phase graph.
    pub fn advance(&mut self, to: DiscussionPhase) -> Result<()> {
        if !self.current.can_advance_to(to) {
            return Err(OrchestratorError::IllegalTransition {
                from: self.current,
                to,
            });
        }
        self.current = to;
        self.history.push(to);
        Ok(())
    }
}
