//! Agent response types.

use ideaforge_models::{AgentRole, Idea, IdeaEvaluation};
use serde::{Deserialize, Serialize};

/// Output of one agent invocation.
///
/// `content` is always the raw text returned by the backend (fence-stripped
/// for the report writer). `ideas` and `evaluations` carry whatever
/// structured data could be extracted from it; both are empty when nothing
/// parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Role that produced the response.
    pub role: AgentRole,

    /// Text content of the response.
    pub content: String,

    /// Newly proposed ideas.
    #[serde(default)]
    pub ideas: Vec<Idea>,

    /// Scores for existing ideas.
    #[serde(default)]
    pub evaluations: Vec<IdeaEvaluation>,
}

impl AgentResponse {
    /// Plain text response.
    pub fn text(role: AgentRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            ideas: Vec::new(),
            evaluations: Vec::new(),
        }
    }

    /// Response carrying proposed ideas.
    pub fn with_ideas(role: AgentRole, content: impl Into<String>, ideas: Vec<Idea>) -> Self {
        Self {
            ideas,
            ..Self::text(role, content)
        }
    }

    /// Response carrying idea evaluations.
    pub fn with_evaluations(
        role: AgentRole,
        content: impl Into<String>,
        evaluations: Vec<IdeaEvaluation>,
    ) -> Self {
        Self {
            evaluations,
            ..Self::text(role, content)
        }
    }

    /// Whether any structured data was extracted.
    pub fn has_structured_output(&self) -> bool {
        !self.ideas.is_empty() || !self.evaluations.is_empty()
    }

    /// First line of the content, shortened for progress output.
    pub fn summary(&self, max_chars: usize) -> String {
        let first = self
            .content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or("");
        crate::context::truncate(first, max_chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_response() {
        let response = AgentResponse::text(AgentRole::TeamLeader, "Let's go");
        assert_eq!(response.role, AgentRole::TeamLeader);
        assert_eq!(response.content, "Let's go");
        assert!(!response.has_structured_output());
    }

    #[test]
    fn test_with_ideas() {
        let idea = Idea::new("A", "B", None, AgentRole::Ideation);
        let response = AgentResponse::with_ideas(AgentRole::Ideation, "raw", vec![idea]);
        assert_eq!(response.ideas.len(), 1);
        assert!(response.has_structured_output());
    }

    #[test]
    fn test_summary_uses_first_nonblank_line() {
        let response = AgentResponse::text(AgentRole::Critic, "\n\n  Key risks are cost.\nMore detail");
        assert_eq!(response.summary(100), "Key risks are cost.");
        assert_eq!(response.summary(3), "Key...");
    }
}
