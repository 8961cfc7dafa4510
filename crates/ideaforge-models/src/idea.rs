//! Ideas and their moderator evaluations.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::ids::IdeaId;
use crate::role::AgentRole;

/// Upper bound of the validation score scale.
pub const MAX_SCORE: f64 = 10.0;

/// An idea proposed during the discussion.
///
/// An idea starts unvalidated with a zero score and no pros or cons.
/// [`Idea::record_evaluation`] is the only way to change that. Deserialized
/// records are checked against the same rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IdeaRecord")]
pub struct Idea {
    /// Unique identifier, stable for the discussion's lifetime.
    pub id: IdeaId,

    /// Short title.
    pub title: String,

    /// Free-text description.
    pub description: String,

    /// Optional category or domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Role of the agent that proposed the idea.
    pub created_by: AgentRole,

    validated: bool,
    score: f64,
    #[serde(default)]
    pros: Vec<String>,
    #[serde(default)]
    cons: Vec<String>,
}

impl Idea {
    /// Creates a new unvalidated idea with a fresh id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: Option<String>,
        created_by: AgentRole,
    ) -> Self {
        Self {
            id: IdeaId::new(),
            title: title.into(),
            description: description.into(),
            category: category.filter(|c| !c.trim().is_empty()),
            created_by,
            validated: false,
            score: 0.0,
            pros: Vec::new(),
            cons: Vec::new(),
        }
    }

    /// Whether a moderator evaluation has been recorded.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Validation score (0.0 until validated).
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Strengths recorded by the moderator.
    pub fn pros(&self) -> &[String] {
        &self.pros
    }

    /// Weaknesses recorded by the moderator.
    pub fn cons(&self) -> &[String] {
        &self.cons
    }

    /// Records a moderator evaluation, marking the idea validated.
    ///
    /// The score is clamped to `0.0..=MAX_SCORE`; a non-finite score counts as 0.
    pub fn record_evaluation(&mut self, score: f64, pros: Vec<String>, cons: Vec<String>) {
        self.score = if score.is_finite() {
            score.clamp(0.0, MAX_SCORE)
        } else {
            0.0
        };
        self.pros = pros;
        self.cons = cons;
        self.validated = true;
    }
}

/// Wire shape of a stored [`Idea`], checked before it becomes one.
#[derive(Deserialize)]
struct IdeaRecord {
    id: IdeaId,
    title: String,
    description: String,
    #[serde(default)]
    category: Option<String>,
    created_by: AgentRole,
    validated: bool,
    score: f64,
    #[serde(default)]
    pros: Vec<String>,
    #[serde(default)]
    cons: Vec<String>,
}

impl TryFrom<IdeaRecord> for Idea {
    type Error = ConfigError;

    fn try_from(r: IdeaRecord) -> Result<Self, Self::Error> {
        if !r.score.is_finite() || !(0.0..=MAX_SCORE).contains(&r.score) {
            return Err(ConfigError::InvalidIdea(format!(
                "{}: score {} outside 0.0..=10.0",
                r.id, r.score
            )));
        }
        if !r.validated && (r.score != 0.0 || !r.pros.is_empty() || !r.cons.is_empty()) {
            return Err(ConfigError::InvalidIdea(format!(
                "{}: unvalidated idea carries a score or pros/cons",
                r.id
            )));
        }

        Ok(Self {
            id: r.id,
            title: r.title,
            description: r.description,
            category: r.category,
            created_by: r.created_by,
            validated: r.validated,
            score: r.score,
            pros: r.pros,
            cons: r.cons,
        })
    }
}

/// Deserialize a field, reading JSON `null` as the type's default.
///
/// Generated payloads often write `"pros": null` instead of leaving the
/// field out; one such entry must not reject the whole payload.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the moderator's `evaluations` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdeaEvaluation {
    /// Id of the evaluated idea. Models often echo the title here instead.
    #[serde(default, deserialize_with = "null_as_default")]
    pub idea_id: String,

    /// 1-based position of the idea in the discussion's idea list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_index: Option<usize>,

    /// Score on the 0-10 scale.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,

    /// Strengths.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pros: Vec<String>,

    /// Weaknesses.
    #[serde(default, deserialize_with = "null_as_default")]
    pub cons: Vec<String>,

    /// Free-text feedback.
    #[serde(default, deserialize_with = "null_as_default")]
    pub feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_idea_is_unvalidated() {
        let idea = Idea::new("Refill stations", "Bulk refills", None, AgentRole::Ideation);

        assert!(!idea.is_validated());
        assert_eq!(idea.score(), 0.0);
        assert!(idea.pros().is_empty());
        assert!(idea.cons().is_empty());
    }

    #[test]
    fn test_blank_category_is_dropped() {
        let idea = Idea::new("t", "d", Some("  ".into()), AgentRole::Ideation);
        assert!(idea.category.is_none());
    }

    #[test]
    fn test_record_evaluation_clamps_score() {
        let mut idea = Idea::new("t", "d", None, AgentRole::Ideation);
        idea.record_evaluation(12.5, vec!["cheap".into()], vec![]);

        assert!(idea.is_validated());
        assert_eq!(idea.score(), MAX_SCORE);
        assert_eq!(idea.pros(), ["cheap".to_string()]);

        idea.record_evaluation(f64::NAN, vec![], vec![]);
        assert_eq!(idea.score(), 0.0);
    }

    #[test]
    fn test_evaluation_defaults() {
        let eval: IdeaEvaluation = serde_json::from_str(r#"{"idea_id": "x"}"#).unwrap();
        assert_eq!(eval.idea_id, "x");
        assert_eq!(eval.idea_index, None);
        assert_eq!(eval.score, 0.0);
        assert!(eval.pros.is_empty());
    }

    #[test]
    fn test_evaluation_null_fields_read_as_empty() {
        let eval: IdeaEvaluation = serde_json::from_str(
            r#"{"idea_id": null, "idea_index": null, "score": null, "pros": null, "cons": ["slow"], "feedback": null}"#,
        )
        .unwrap();
        assert_eq!(eval.idea_id, "");
        assert_eq!(eval.score, 0.0);
        assert!(eval.pros.is_empty());
        assert_eq!(eval.cons, vec!["slow".to_string()]);
    }

    #[test]
    fn test_stored_idea_round_trips() {
        let mut idea = Idea::new("Refill", "Bulk refills", Some("retail".into()), AgentRole::Ideation);
        idea.record_evaluation(7.0, vec!["cheap".into()], vec![]);

        let json = serde_json::to_string(&idea).unwrap();
        let parsed: Idea = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, idea);
    }

    #[test]
    fn test_unvalidated_record_with_score_is_rejected() {
        let json = r#"{"id": "idea-1", "title": "t", "description": "d", "created_by": "ideation",
            "validated": false, "score": 6.5, "pros": [], "cons": []}"#;
        let err = serde_json::from_str::<Idea>(json).unwrap_err();
        assert!(err.to_string().contains("unvalidated idea"));

        let json = r#"{"id": "idea-2", "title": "t", "description": "d", "created_by": "ideation",
            "validated": true, "score": 14.0}"#;
        assert!(serde_json::from_str::<Idea>(json).is_err());
    }
}
