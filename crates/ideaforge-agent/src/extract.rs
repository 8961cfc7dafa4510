//! Pulling structured payloads out of generated text.
//!
//! Responses mix prose with JSON. Rather than trusting the first `{` and the
//! last `}`, the scanner walks balanced `{...}` regions (aware of string
//! literals and escapes) and returns the first one that deserializes into
//! the requested payload. Anything that fails to parse degrades to an empty
//! result.

use ideaforge_models::idea::null_as_default;
use ideaforge_models::{AgentRole, Idea, IdeaEvaluation};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Upper bound on candidate regions tried per response.
pub const MAX_CANDIDATES: usize = 64;

/// Iterator over balanced `{...}` regions of a text.
///
/// Regions are yielded by position of their opening brace, so an outer
/// object comes before the objects nested inside it.
pub struct BalancedObjects<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> BalancedObjects<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for BalancedObjects<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let bytes = self.text.as_bytes();
        while self.pos < bytes.len() {
            let start = self.pos + bytes[self.pos..].iter().position(|&b| b == b'{')?;
            self.pos = start + 1;
            if let Some(end) = matching_brace(bytes, start) {
                return Some(&self.text[start..=end]);
            }
        }
        None
    }
}

/// Index of the `}` closing the `{` at `open`, if the region is balanced.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// First balanced region of `text` that deserializes as `T`.
pub fn extract_payload<T: DeserializeOwned>(text: &str) -> Option<T> {
    BalancedObjects::new(text)
        .take(MAX_CANDIDATES)
        .find_map(|candidate| serde_json::from_str(candidate).ok())
}

#[derive(Debug, Deserialize)]
struct IdeasPayload {
    ideas: Vec<ProposedIdea>,
}

#[derive(Debug, Deserialize)]
struct ProposedIdea {
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default)]
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EvaluationsPayload {
    evaluations: Vec<IdeaEvaluation>,
}

/// Ideas proposed in `text`, attributed to `created_by`.
///
/// Every call mints fresh ids. Entries without a title are dropped.
pub fn extract_ideas(text: &str, created_by: AgentRole) -> Vec<Idea> {
    let Some(payload) = extract_payload::<IdeasPayload>(text) else {
        debug!(role = %created_by, "No ideas payload found in response");
        return Vec::new();
    };

    payload
        .ideas
        .into_iter()
        .filter(|idea| !idea.title.trim().is_empty())
        .map(|idea| {
            Idea::new(
                idea.title.trim(),
                idea.description.trim(),
                idea.category,
                created_by,
            )
        })
        .collect()
}

/// Moderator evaluations found in `text`.
pub fn extract_evaluations(text: &str) -> Vec<IdeaEvaluation> {
    match extract_payload::<EvaluationsPayload>(text) {
        Some(payload) => payload.evaluations,
        None => {
            debug!("No evaluations payload found in response");
            Vec::new()
        }
    }
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```html ````).
///
/// Text without a fence is returned trimmed and otherwise untouched.
pub fn strip_code_fences(text: &str) -> String {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const IDEAS: &str = r#"{"ideas": [
        {"title": "Refill stations", "description": "Bulk refills in shops", "category": "retail"},
        {"title": "Deposit scheme", "description": "Money back on return"}
    ]}"#;

    #[test]
    fn test_balanced_regions_in_order() {
        let text = r#"a {"x": {"y": 1}} b {"z": "}"} c"#;
        let regions: Vec<&str> = BalancedObjects::new(text).collect();
        assert_eq!(
            regions,
            vec![r#"{"x": {"y": 1}}"#, r#"{"y": 1}"#, r#"{"z": "}"}"#]
        );
    }

    #[test]
    fn test_unbalanced_text_yields_nothing() {
        assert_eq!(BalancedObjects::new("{ open only").count(), 0);
        assert_eq!(BalancedObjects::new("no braces").count(), 0);
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let text = r#"{"title": "say \"}\" loudly"}"#;
        let regions: Vec<&str> = BalancedObjects::new(text).collect();
        assert_eq!(regions, vec![text]);
    }

    #[test]
    fn test_extract_ideas_from_prose() {
        let text = format!("Here are my ideas:\n```json\n{}\n```\nHope this helps!", IDEAS);
        let ideas = extract_ideas(&text, AgentRole::Ideation);

        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[0].title, "Refill stations");
        assert_eq!(ideas[0].category.as_deref(), Some("retail"));
        assert_eq!(ideas[1].category, None);
        assert!(ideas.iter().all(|i| i.created_by == AgentRole::Ideation));
        assert!(ideas.iter().all(|i| !i.is_validated()));
    }

    #[test]
    fn test_stray_braces_do_not_corrupt_extraction() {
        let text = format!(
            "Consider a set like {{a, b}} first.\n{}\nThen maybe {{more}} later.",
            IDEAS
        );
        assert_eq!(extract_ideas(&text, AgentRole::Ideation).len(), 2);
    }

    #[test]
    fn test_extraction_is_idempotent_on_content_not_identity() {
        let first = extract_ideas(IDEAS, AgentRole::Ideation);
        let second = extract_ideas(IDEAS, AgentRole::Ideation);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.title, b.title);
            assert_eq!(a.description, b.description);
            assert_eq!(a.category, b.category);
            assert_ne!(a.id, b.id);
        }
    }

    #[test]
    fn test_malformed_payload_gives_empty_result() {
        assert!(extract_ideas(r#"{"ideas": [{"title": }"#, AgentRole::Ideation).is_empty());
        assert!(extract_ideas("no json at all", AgentRole::Ideation).is_empty());
        assert!(extract_ideas(r#"{"other": 1}"#, AgentRole::Ideation).is_empty());
    }

    #[test]
    fn test_extract_evaluations() {
        let text = r#"My assessment:
        {"evaluations": [
            {"idea_id": "idea-1", "score": 8.5, "pros": ["cheap"], "cons": ["slow"], "feedback": "good"},
            {"idea_index": 2, "score": 6}
        ], "overall_assessment": "solid"}"#;

        let evals = extract_evaluations(text);
        assert_eq!(evals.len(), 2);
        assert_eq!(evals[0].idea_id, "idea-1");
        assert_eq!(evals[0].pros, vec!["cheap".to_string()]);
        assert_eq!(evals[1].idea_index, Some(2));
        assert_eq!(evals[1].score, 6.0);
    }

    #[test]
    fn test_null_field_in_one_evaluation_keeps_the_rest() {
        let text = r#"{"evaluations": [
            {"idea_id": "A", "score": 8, "pros": ["cheap"], "cons": ["slow"]},
            {"idea_id": "B", "score": 6, "pros": null, "cons": [], "feedback": null}
        ]}"#;

        let evals = extract_evaluations(text);
        assert_eq!(evals.len(), 2);
        assert_eq!(evals[0].pros, vec!["cheap".to_string()]);
        assert_eq!(evals[1].idea_id, "B");
        assert_eq!(evals[1].score, 6.0);
        assert!(evals[1].pros.is_empty());
    }

    #[test]
    fn test_null_description_keeps_every_idea() {
        let text = r#"{"ideas": [
            {"title": "Refill stations", "description": "Bulk refills", "category": "retail"},
            {"title": "Deposit scheme", "description": null, "category": null},
            {"title": null, "description": "untitled"}
        ]}"#;

        let ideas = extract_ideas(text, AgentRole::Ideation);
        assert_eq!(ideas.len(), 2);
        assert_eq!(ideas[1].title, "Deposit scheme");
        assert_eq!(ideas[1].description, "");
        assert_eq!(ideas[1].category, None);
    }

    #[test]
    fn test_strip_html_fence_keeps_inner_bytes() {
        let inner = "<!DOCTYPE html>\n<html>\n  <body>{ok}</body>\n</html>";
        let fenced = format!("```html\n{}\n```", inner);
        assert_eq!(strip_code_fences(&fenced), inner);

        let bare = format!("```\n{}\n```\n", inner);
        assert_eq!(strip_code_fences(&bare), inner);
    }

    #[test]
    fn test_strip_without_fence_is_noop() {
        assert_eq!(strip_code_fences("  <p>hi</p>\n"), "<p>hi</p>");
    }
}
