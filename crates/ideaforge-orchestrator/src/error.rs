//! Error types for the orchestrator.

use ideaforge_agent::AgentError;
use ideaforge_models::{AgentRole, ConfigError};
use thiserror::Error;

use crate::phase::DiscussionPhase;

/// Orchestrator-specific errors.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A fatal agent call failed.
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// Team or discussion configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A role the current phase needs has no agent.
    #[error("Configuration error: no agent for required role {0}")]
    MissingAgent(AgentRole),

    /// Operation not valid for the discussion's current state.
    #[error("State error: {0}")]
    State(String),

    /// Illegal phase transition.
    #[error("State error: illegal phase transition {from} -> {to}")]
    IllegalTransition {
        from: DiscussionPhase,
        to: DiscussionPhase,
    },

    /// Final validation was asked to score an empty idea list.
    #[error("no ideas to validate")]
    NoIdeasToValidate,

    /// The discussion was cancelled by its caller.
    #[error("discussion cancelled")]
    Cancelled,

    /// Discussion id not present in the session store.
    #[error("Discussion not found: {0}")]
    DiscussionNotFound(String),
}

impl OrchestratorError {
    /// Whether the error came from a failed backend call.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::Agent(AgentError::Generation { .. }))
    }
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrchestratorError>;
