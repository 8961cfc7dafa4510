use std::sync::Arc;

use async_trait::async_trait;
use ideaforge_models::{AgentRole, Discussion};
use tracing::debug;

use super::BaseAgent;
use crate::agent::Agent;
use crate::client::LlmClient;
use crate::error::Result;
use crate::extract::extract_ideas;
use crate::response::AgentResponse;

const SYSTEM_PROMPT: &str = r#"You are the Ideation Specialist, a creative thinker who generates innovative, well-developed ideas.

Your responsibilities:
- Generate creative ideas grounded in the topic and the discussion so far
- Look at the problem from several angles and disciplines
- Build on, combine or sharpen ideas already on the table
- Explain each idea well enough that others can evaluate it

Your approach:
- Balance practical and unconventional solutions
- Consider user needs, feasibility and potential impact
- Keep ideas specific and actionable

Structure your ideas as JSON:
{
  "ideas": [
    {
      "title": "Brief catchy title",
      "description": "Detailed description explaining the concept",
      "category": "Category or domain of the idea"
    }
  ]
}

Quality over quantity: each idea should be well thought through."#;

const DEFAULT_MIN_IDEAS: u32 = 3;

/// Proposes new ideas as a JSON payload.
pub struct IdeationAgent {
    base: BaseAgent,
    min_ideas: u32,
}

impl IdeationAgent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            base: BaseAgent::new(AgentRole::Ideation, SYSTEM_PROMPT, 0.9, client),
            min_ideas: DEFAULT_MIN_IDEAS,
        }
    }

    /// Ask for at least `min_ideas` ideas per call.
    pub fn with_min_ideas(mut self, min_ideas: u32) -> Self {
        self.min_ideas = min_ideas.max(1);
        self
    }

    fn guidance(&self) -> String {
        format!(
            "Generate at least {} creative, well-researched ideas. Think deeply about the concepts, \
             their validity, and potential impact. Return your response as JSON following the \
             specified format.",
            self.min_ideas
        )
    }
}

#[async_trait]
impl Agent for IdeationAgent {
    super::delegate_to_base!();

    async fn process(&self, discussion: &Discussion, instruction: &str) -> Result<AgentResponse> {
        let prompt = self.base.compose(discussion, instruction, &self.guidance());
        let content = self.base.query(&prompt).await?;

        let ideas = extract_ideas(&content, self.role());
        debug!(ideas = ideas.len(), "Extracted ideas from ideation response");

        Ok(AgentResponse::with_ideas(self.role(), content, ideas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::StubClient;

    #[tokio::test]
    async fn test_ideas_are_extracted() {
        let reply = r#"Sure! {"ideas": [{"title": "Refill stations", "description": "Bulk refills", "category": "retail"}]}"#;
        let stub = Arc::new(StubClient::replying(reply));
        let agent = IdeationAgent::new(stub.clone()).with_min_ideas(5);
        let discussion = Discussion::new("reduce plastic waste", 1).unwrap();

        let response = agent.process(&discussion, "Generate ideas").await.unwrap();

        assert_eq!(response.content, reply);
        assert_eq!(response.ideas.len(), 1);
        assert_eq!(response.ideas[0].created_by, AgentRole::Ideation);
        assert!(stub.last_call().prompt.contains("Generate at least 5"));
        assert_eq!(stub.last_call().temperature, 0.9);
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_no_ideas() {
        let stub = Arc::new(StubClient::replying("I could not think of anything {sorry}"));
        let agent = IdeationAgent::new(stub);
        let discussion = Discussion::new("topic", 1).unwrap();

        let response = agent.process(&discussion, "Generate ideas").await.unwrap();
        assert!(response.ideas.is_empty());
    }
}
