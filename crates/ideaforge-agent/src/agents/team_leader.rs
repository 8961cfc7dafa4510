use std::sync::Arc;

use async_trait::async_trait;
use ideaforge_models::{AgentRole, Discussion};

use super::BaseAgent;
use crate::agent::Agent;
use crate::client::LlmClient;
use crate::error::Result;
use crate::response::AgentResponse;

const SYSTEM_PROMPT: &str = "You are the Team Leader of a small team of AI specialists working through \
a structured ideation session.

Your responsibilities:
- Open the session, frame the topic and set expectations for each team member
- Keep the discussion focused and moving from exploration to validation to selection
- Synthesize each round: what was learned, which ideas are strongest, what needs more depth
- Explain the reasoning behind the final choice
- Direct the report writer toward what decision-makers need to see

Communication style:
- Decisive but collaborative
- Specific about who should do what next
- Acknowledge good contributions and call out gaps

Always ground your remarks in the discussion so far.";

const GUIDANCE: &str =
    "Provide your leadership input. What should the team focus on next? Who should contribute?";

/// Frames, synthesizes and closes the discussion.
pub struct TeamLeaderAgent {
    base: BaseAgent,
}

impl TeamLeaderAgent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            base: BaseAgent::new(AgentRole::TeamLeader, SYSTEM_PROMPT, 0.7, client),
        }
    }
}

#[async_trait]
impl Agent for TeamLeaderAgent {
    super::delegate_to_base!();

    async fn process(&self, discussion: &Discussion, instruction: &str) -> Result<AgentResponse> {
        let prompt = self.base.compose(discussion, instruction, GUIDANCE);
        let content = self.base.query(&prompt).await?;
        Ok(AgentResponse::text(self.role(), content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::StubClient;

    #[tokio::test]
    async fn test_leader_prompt_contains_context_and_task() {
        let stub = Arc::new(StubClient::replying("Welcome, team."));
        let agent = TeamLeaderAgent::new(stub.clone());
        let discussion = Discussion::new("urban farming", 1).unwrap();

        let response = agent.process(&discussion, "Kick off the session").await.unwrap();

        assert_eq!(response.role, AgentRole::TeamLeader);
        assert_eq!(response.content, "Welcome, team.");
        assert!(response.ideas.is_empty());

        let call = stub.last_call();
        assert!(call.prompt.starts_with("Topic: urban farming\n\n"));
        assert!(call.prompt.contains("Task: Kick off the session"));
        assert_eq!(call.system_prompt, SYSTEM_PROMPT);
        assert_eq!(call.temperature, 0.7);
        assert_eq!(call.max_tokens, 4096);
    }
}
