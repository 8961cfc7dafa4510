//! Discussion orchestration for Ideaforge.
//!
//! The [`Orchestrator`] runs a team of role agents through a fixed sequence
//! of phases:
//!
//! 1. **Kickoff**: the team leader frames the topic
//! 2. **Rounds**: researcher, ideation, critic and implementer contribute in
//!    turn, then the leader synthesizes
//! 3. **Final validation**: the moderator scores every idea
//! 4. **Final selection**: the leader explains the choice and the top-scoring
//!    idea becomes the final idea
//! 5. **Visualization**: the report writer produces the report artifact
//!
//! Progress is published as [`DiscussionEvent`]s. The discussion itself is
//! read through a [`DiscussionHandle`], and hosting layers that run many
//! discussions keep them in a [`SessionStore`].

pub mod error;
pub mod events;
pub mod handle;
pub mod orchestrator;
pub mod phase;
pub mod session;

pub use error::{OrchestratorError, Result};
pub use events::{DiscussionEvent, EventBus, ProgressCallback};
pub use handle::DiscussionHandle;
pub use orchestrator::Orchestrator;
pub use phase::{DiscussionPhase, PhaseTracker};
pub use session::{SessionStore, SessionSummary};
pub use tokio_util::sync::CancellationToken;
