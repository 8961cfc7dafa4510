use std::sync::Arc;

use async_trait::async_trait;
use ideaforge_models::{AgentRole, Discussion};

use super::BaseAgent;
use crate::agent::Agent;
use crate::client::LlmClient;
use crate::context::build_detailed_context;
use crate::error::Result;
use crate::extract::strip_code_fences;
use crate::response::AgentResponse;

/// Token budget for the report.
pub const REPORT_MAX_TOKENS: u32 = 8192;

/// Number of ranked ideas the report analyses in depth.
pub const REPORT_TOP_IDEAS: usize = 4;

const SYSTEM_PROMPT: &str = "You are the Report Writer, turning a team discussion into a \
comprehensive, professional report for decision-makers.

Your responsibilities:
- Produce a multi-section, self-contained HTML document with embedded CSS
- Cover every idea explored, with depth on the top candidates
- Explain why ideas were selected or set aside
- Close with open questions and concrete next steps

Report structure:
1. Executive summary: topic, final recommendation with score, key decision factors
2. Recommended solution: description, pros and cons, implementation considerations, risks
3. Runner-up ideas: score, pros and cons, why each was not selected, when it might win
4. All ideas explored: complete list with scores and a short assessment
5. Discussion journey: how the ideas evolved across rounds
6. Comparative analysis: criteria, trade-offs, side-by-side view of the top ideas
7. Open questions and next steps
8. Recommendations: implementation, timeline, resources, success metrics

Design: clean professional styling, clear section headers, green for strengths and the \
selected idea, red for weaknesses, print-friendly and responsive layout.

Return only the HTML document.";

/// Produces the final long-form report artifact.
pub struct ReportWriterAgent {
    base: BaseAgent,
}

impl ReportWriterAgent {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            base: BaseAgent::new(AgentRole::ReportWriter, SYSTEM_PROMPT, 0.6, client)
                .with_max_tokens(REPORT_MAX_TOKENS),
        }
    }
}

fn top_ideas_brief(discussion: &Discussion) -> String {
    let top = discussion.top_ideas(REPORT_TOP_IDEAS);
    if top.is_empty() {
        return String::from("No ideas were recorded in this discussion.\n");
    }

    let mut out = format!("Top {} ideas by score:\n", top.len());
    for (rank, idea) in top.iter().enumerate() {
        out.push_str(&format!("{}. {} ({:.1}/10)\n", rank + 1, idea.title, idea.score()));
    }
    out
}

#[async_trait]
impl Agent for ReportWriterAgent {
    super::delegate_to_base!();

    async fn process(&self, discussion: &Discussion, instruction: &str) -> Result<AgentResponse> {
        let task = format!(
            "{}\n{}\n{}",
            instruction,
            build_detailed_context(discussion),
            top_ideas_brief(discussion)
        );
        let guidance = "Generate a comprehensive, multi-section HTML report following the \
            structure in your system prompt. Analyse the runner-up ideas, not just the winner, \
            and explain specifically why each was not selected. Include open questions and \
            actionable next steps. Return complete, self-contained HTML with embedded CSS.";

        let prompt = self.base.compose(discussion, &task, guidance);
        let content = self.base.query(&prompt).await?;

        Ok(AgentResponse::text(self.role(), strip_code_fences(&content)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::StubClient;
    use ideaforge_models::{Idea, IdeaEvaluation};

    #[tokio::test]
    async fn test_report_is_fence_stripped() {
        let html = "<!DOCTYPE html>\n<html><body><h1>Report</h1></body></html>";
        let stub = Arc::new(StubClient::replying(format!("```html\n{}\n```", html)));
        let agent = ReportWriterAgent::new(stub.clone());
        let discussion = Discussion::new("topic", 1).unwrap();

        let response = agent.process(&discussion, "Write the report").await.unwrap();

        assert_eq!(response.content, html);
        assert_eq!(stub.last_call().max_tokens, REPORT_MAX_TOKENS);
        assert!(stub.last_call().prompt.contains("No ideas were recorded"));
    }

    #[tokio::test]
    async fn test_prompt_ranks_top_ideas() {
        let stub = Arc::new(StubClient::replying("<html></html>"));
        let agent = ReportWriterAgent::new(stub.clone());
        let mut d = Discussion::new("topic", 1).unwrap();
        for title in ["A", "B", "C", "D", "E"] {
            d.add_idea(Idea::new(title, "desc", None, AgentRole::Ideation));
        }
        let id = d.ideas()[4].id.to_string();
        d.apply_evaluations(&[IdeaEvaluation {
            idea_id: id,
            score: 9.0,
            ..Default::default()
        }]);

        agent.process(&d, "Write the report").await.unwrap();

        let prompt = stub.last_call().prompt;
        assert!(prompt.contains("Top 4 ideas by score:\n1. E (9.0/10)"));
        assert!(prompt.contains("DETAILED DISCUSSION CONTEXT"));
    }
}
