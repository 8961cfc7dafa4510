//! Core data models for Ideaforge.
//!
//! This crate provides the fundamental data types shared by the agent and
//! orchestrator crates: the discussion transcript, ideas and their
//! evaluations, agent roles and the team configuration.

pub mod discussion;
pub mod error;
pub mod idea;
pub mod ids;
pub mod message;
pub mod role;
pub mod team;

// Re-export main types
pub use discussion::{Discussion, DiscussionStatus};
pub use error::{ConfigError, Result};
pub use idea::{Idea, IdeaEvaluation, MAX_SCORE};
pub use ids::{DiscussionId, IdeaId, MessageId};
pub use message::{Message, MessageKind, Participant};
pub use role::AgentRole;
pub use team::TeamConfig;
