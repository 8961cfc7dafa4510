//! The seven role agents.
//!
//! Every agent is a [`BaseAgent`] (role, name, system prompt, temperature,
//! token budget, shared client) plus a role-specific prompt tail and, for
//! ideation, moderation and reporting, post-processing of the reply.

mod ideation;
mod moderator;
mod report_writer;
mod specialists;
mod team_leader;

use std::sync::Arc;

use ideaforge_models::{AgentRole, Discussion, TeamConfig};
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::client::{LlmClient, DEFAULT_MAX_TOKENS};
use crate::context::build_context;
use crate::error::{AgentError, Result};

pub use ideation::IdeationAgent;
pub use moderator::ModeratorAgent;
pub use report_writer::{ReportWriterAgent, REPORT_MAX_TOKENS, REPORT_TOP_IDEAS};
pub use specialists::{CriticAgent, ImplementerAgent, ResearcherAgent};
pub use team_leader::TeamLeaderAgent;

/// State shared by every role agent.
pub struct BaseAgent {
    role: AgentRole,
    system_prompt: &'static str,
    temperature: f32,
    max_tokens: u32,
    client: Arc<dyn LlmClient>,
}

impl BaseAgent {
    pub(crate) fn new(
        role: AgentRole,
        system_prompt: &'static str,
        temperature: f32,
        client: Arc<dyn LlmClient>,
    ) -> Self {
        Self {
            role,
            system_prompt,
            temperature,
            max_tokens: DEFAULT_MAX_TOKENS,
            client,
        }
    }

    pub(crate) fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn name(&self) -> &'static str {
        self.role.display_name()
    }

    pub fn system_prompt(&self) -> &'static str {
        self.system_prompt
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Standard prompt: discussion context, the task, then role guidance.
    pub(crate) fn compose(&self, discussion: &Discussion, instruction: &str, guidance: &str) -> String {
        format!(
            "{}\n\nTask: {}\n\n{}",
            build_context(discussion),
            instruction,
            guidance
        )
    }

    /// Send `prompt` as a single user turn.
    pub(crate) async fn query(&self, prompt: &str) -> Result<String> {
        debug!(
            role = %self.role,
            model = %self.client.model(),
            prompt_chars = prompt.len(),
            "Querying backend"
        );

        self.client
            .simple_query(prompt, self.system_prompt, self.temperature, self.max_tokens)
            .await
            .map_err(|source| {
                warn!(role = %self.role, error = %source, "Backend call failed");
                AgentError::Generation {
                    role: self.role,
                    source,
                }
            })
    }
}

/// Implements the accessor half of [`Agent`] by delegating to `self.base`.
macro_rules! delegate_to_base {
    () => {
        fn role(&self) -> ideaforge_models::AgentRole {
            self.base.role()
        }

        fn name(&self) -> &str {
            self.base.name()
        }

        fn system_prompt(&self) -> &str {
            self.base.system_prompt()
        }

        fn temperature(&self) -> f32 {
            self.base.temperature()
        }
    };
}
pub(crate) use delegate_to_base;

/// Construct the agent for `role` with default settings.
pub fn create_agent(role: AgentRole, client: Arc<dyn LlmClient>) -> Box<dyn Agent> {
    match role {
        AgentRole::TeamLeader => Box::new(TeamLeaderAgent::new(client)),
        AgentRole::Ideation => Box::new(IdeationAgent::new(client)),
        AgentRole::Moderator => Box::new(ModeratorAgent::new(client)),
        AgentRole::ReportWriter => Box::new(ReportWriterAgent::new(client)),
        AgentRole::Researcher => Box::new(ResearcherAgent::new(client)),
        AgentRole::Critic => Box::new(CriticAgent::new(client)),
        AgentRole::Implementer => Box::new(ImplementerAgent::new(client)),
    }
}

/// Construct one agent per role active in `config`, in [`AgentRole::ALL`] order.
pub fn create_team(config: &TeamConfig, client: Arc<dyn LlmClient>) -> Vec<Box<dyn Agent>> {
    config
        .active_roles()
        .into_iter()
        .map(|role| match role {
            AgentRole::Ideation => Box::new(
                IdeationAgent::new(Arc::clone(&client)).with_min_ideas(config.min_ideas),
            ) as Box<dyn Agent>,
            other => create_agent(other, Arc::clone(&client)),
        })
        .collect()
}
