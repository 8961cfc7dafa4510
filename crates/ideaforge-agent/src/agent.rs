//! The role-agent contract.

use async_trait::async_trait;
use ideaforge_models::{AgentRole, Discussion};

use crate::error::Result;
use crate::response::AgentResponse;

/// A role-specialized participant in a discussion.
///
/// Agents hold no discussion state of their own. Each call receives a
/// read-only snapshot plus an instruction and returns an [`AgentResponse`];
/// applying ideas or evaluations to the discussion is the caller's job.
///
/// The trait is object-safe so teams can be held as `Box<dyn Agent>`.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Role this agent plays.
    fn role(&self) -> AgentRole;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Fixed system prompt sent with every request.
    fn system_prompt(&self) -> &str;

    /// Sampling temperature used for requests.
    fn temperature(&self) -> f32;

    /// Handle `instruction` in the context of `discussion`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AgentError::Generation`] when the backend call fails.
    async fn process(&self, discussion: &Discussion, instruction: &str) -> Result<AgentResponse>;
}
