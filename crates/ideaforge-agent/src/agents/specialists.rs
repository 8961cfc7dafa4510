//! Round contributors that answer in prose only.

use std::sync::Arc;

use async_trait::async_trait;
use ideaforge_models::{AgentRole, Discussion};

use super::BaseAgent;
use crate::agent::Agent;
use crate::client::LlmClient;
use crate::error::Result;
use crate::response::AgentResponse;

const RESEARCHER_PROMPT: &str = "You are the Research Specialist, bringing factual grounding to \
the team's ideas.

Your responsibilities:
- Survey existing solutions, products and approaches in the domain
- Provide data, statistics and evidence
- Identify trends, user needs and gaps in current solutions
- Reference case studies and real-world precedents
- Note regulatory, technical and market constraints

Lead with key findings, support claims with examples and stay concise.";

const CRITIC_PROMPT: &str = "You are the Critical Analyst, a constructive skeptic.

Your responsibilities:
- Challenge the assumptions behind each idea
- Identify failure modes, risks and unintended consequences
- Ask the difficult questions that need answers
- Point out inconsistencies and overlooked edge cases

Be skeptical but not dismissive: your criticism should make ideas stronger.";

const IMPLEMENTER_PROMPT: &str = "You are the Implementation Specialist, focused on execution.

Your responsibilities:
- Work out how ideas would actually be built or delivered
- Break ideas into actionable steps and phases
- Identify technical requirements, dependencies and resource needs
- Propose a minimum viable first version
- Flag blockers and be realistic about effort

Ground visionary ideas in practical execution plans.";

macro_rules! prose_agent {
    ($(#[$doc:meta])* $name:ident, $role:expr, $prompt:expr, $temperature:expr, $guidance:expr) => {
        $(#[$doc])*
        pub struct $name {
            base: BaseAgent,
        }

        impl $name {
            pub fn new(client: Arc<dyn LlmClient>) -> Self {
                Self {
                    base: BaseAgent::new($role, $prompt, $temperature, client),
                }
            }
        }

        #[async_trait]
        impl Agent for $name {
            super::delegate_to_base!();

            async fn process(
                &self,
                discussion: &Discussion,
                instruction: &str,
            ) -> Result<AgentResponse> {
                let prompt = self.base.compose(discussion, instruction, $guidance);
                let content = self.base.query(&prompt).await?;
                Ok(AgentResponse::text(self.role(), content))
            }
        }
    };
}

prose_agent!(
    /// Supplies evidence, precedents and context.
    ResearcherAgent,
    AgentRole::Researcher,
    RESEARCHER_PROMPT,
    0.4,
    "Provide research-backed insights. Include specific examples, data, or case studies where relevant."
);

prose_agent!(
    /// Challenges assumptions and surfaces risks.
    CriticAgent,
    AgentRole::Critic,
    CRITIC_PROMPT,
    0.6,
    "Challenge assumptions and identify potential weaknesses. Ask tough questions that need answers."
);

prose_agent!(
    /// Turns ideas into execution plans.
    ImplementerAgent,
    AgentRole::Implementer,
    IMPLEMENTER_PROMPT,
    0.6,
    "Focus on practical implementation. How would this actually be built or executed?"
);
