use std::sync::Arc;

use async_trait::async_trait;
use ideaforge_models::{AgentRole, Discussion};
use tracing::debug;

use super::BaseAgent;
use crate::agent::Agent;
use crate::client::LlmClient;
use crate::error::Result;
use crate::extract::extract_evaluations;
use crate::response::AgentResponse;

const SYSTEM_PROMPT: &str = r#"You are the Moderator/Facilitator, responsible for the quality and validity of the team's ideas.

Your responsibilities:
- Critically evaluate every proposed idea
- Check feasibility, coherence and value
- Identify risks and limitations
- Give constructive feedback
- Assign each idea a score from 0 to 10

Evaluation criteria:
- Feasibility: can this realistically be implemented?
- Innovation: is it creative and differentiated?
- Impact: what value does it provide?
- Clarity: is it well defined?
- Completeness: is it fully thought through?

Structure your response as JSON, one evaluation per idea:
{
  "evaluations": [
    {
      "idea_id": "id of the idea, copied from the reference table",
      "idea_index": 1,
      "score": 8.5,
      "pros": ["strength 1", "strength 2"],
      "cons": ["weakness 1", "weakness 2"],
      "feedback": "Detailed feedback and suggestions"
    }
  ],
  "overall_assessment": "Summary of the evaluation"
}

Be thorough, fair and constructive."#;

const GUIDANCE: &str = "Evaluate the ideas presented. Provide scores, identify pros and cons, and \
give detailed feedback. Return your response as JSON following the specified format.";

/// Scores and critiques the accumulated ideas.
pub struct ModeratorAgent {
    base: BaseAgent,
}

impl ModeratorAgent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            base: BaseAgent::new(AgentRole::Moderator, SYSTEM_PROMPT, 0.5, client),
        }
    }
}

/// Lines of the form `[N] id=<id> title=<title>` so replies can echo a
/// stable position or id.
fn reference_table(discussion: &Discussion) -> String {
    let mut out = String::from("Idea reference (use idea_index or idea_id exactly as shown):\n");
    for (i, idea) in discussion.ideas().iter().enumerate() {
        out.push_str(&format!("[{}] id={} title={}\n", i + 1, idea.id, idea.title));
    }
    out
}

#[async_trait]
impl Agent for ModeratorAgent {
    super::delegate_to_base!();

    async fn process(&self, discussion: &Discussion, instruction: &str) -> Result<AgentResponse> {
        let task = format!("{}\n\n{}", instruction, reference_table(discussion));
        let prompt = self.base.compose(discussion, &task, GUIDANCE);
        let content = self.base.query(&prompt).await?;

        let evaluations = extract_evaluations(&content);
        debug!(
            evaluations = evaluations.len(),
            ideas = discussion.ideas().len(),
            "Extracted evaluations from moderator response"
        );

        Ok(AgentResponse::with_evaluations(self.role(), content, evaluations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::StubClient;
    use ideaforge_models::Idea;

    fn discussion() -> Discussion {
        let mut d = Discussion::new("reduce plastic waste", 1).unwrap();
        d.add_idea(Idea::new("Refill", "Refill stations", None, AgentRole::Ideation));
        d.add_idea(Idea::new("Refill stations", "Bulk refills", None, AgentRole::Ideation));
        d
    }

    #[test]
    fn test_reference_table_lists_positions_and_ids() {
        let d = discussion();
        let table = reference_table(&d);
        let expected = format!("[2] id={} title=Refill stations", d.ideas()[1].id);
        assert!(table.contains(&expected));
        assert!(table.contains("[1] id="));
    }

    #[tokio::test]
    async fn test_title_fallback_updates_exact_match_only() {
        let reply = r#"{"evaluations": [{"idea_id": "Refill stations", "score": 9, "pros": ["easy"], "cons": ["space"]}]}"#;
        let stub = Arc::new(StubClient::replying(reply));
        let agent = ModeratorAgent::new(stub.clone());
        let mut d = discussion();

        let response = agent.process(&d, "Validate all ideas").await.unwrap();
        assert_eq!(response.evaluations.len(), 1);
        assert_eq!(d.apply_evaluations(&response.evaluations), 1);

        assert!(!d.ideas()[0].is_validated());
        assert_eq!(d.ideas()[0].score(), 0.0);
        assert_eq!(d.ideas()[1].score(), 9.0);
        assert_eq!(d.ideas()[1].pros(), ["easy".to_string()]);
        assert_eq!(d.ideas()[1].cons(), ["space".to_string()]);

        let call = stub.last_call();
        assert!(call.prompt.contains("Validate all ideas"));
        assert!(call.prompt.contains("Idea reference"));
        assert_eq!(call.temperature, 0.5);
    }

    #[tokio::test]
    async fn test_index_correlation() {
        let reply = r#"{"evaluations": [{"idea_id": "made-up", "idea_index": 1, "score": 6.5}]}"#;
        let agent = ModeratorAgent::new(Arc::new(StubClient::replying(reply)));
        let mut d = discussion();

        let response = agent.process(&d, "Validate").await.unwrap();
        d.apply_evaluations(&response.evaluations);

        assert_eq!(d.ideas()[0].score(), 6.5);
        assert!(!d.ideas()[1].is_validated());
    }
}
