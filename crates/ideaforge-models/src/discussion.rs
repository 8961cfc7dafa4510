//! The shared record of a single ideation session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ConfigError, Result};
use crate::idea::{Idea, IdeaEvaluation};
use crate::ids::{DiscussionId, IdeaId};
use crate::message::{Message, MessageKind};

/// Lifecycle status of a discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscussionStatus {
    Running,
    Completed,
    Failed,
}

impl DiscussionStatus {
    /// Whether the discussion has stopped, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for DiscussionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A complete discussion session.
///
/// The message log is append-only and ideas are never removed. The only
/// idea-level mutation is [`Discussion::apply_evaluations`]. The final idea
/// is stored by id so it always refers to the record in `ideas`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub id: DiscussionId,
    pub topic: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: DiscussionStatus,
    /// Current exploration round (0 before the first round starts).
    pub round: u32,
    pub max_rounds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    messages: Vec<Message>,
    ideas: Vec<Idea>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    final_idea: Option<IdeaId>,
}

impl Discussion {
    /// Starts a new running discussion on `topic`.
    pub fn new(topic: impl Into<String>, max_rounds: u32) -> Result<Self> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(ConfigError::EmptyTopic);
        }
        if max_rounds == 0 {
            return Err(ConfigError::InvalidRounds(max_rounds));
        }

        Ok(Self {
            id: DiscussionId::new(),
            topic: topic.trim().to_string(),
            start_time: Utc::now(),
            end_time: None,
            status: DiscussionStatus::Running,
            round: 0,
            max_rounds,
            summary: None,
            messages: Vec::new(),
            ideas: Vec::new(),
            final_idea: None,
        })
    }

    /// The transcript in append order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Ideas in insertion order.
    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    /// Appends a message to the transcript.
    pub fn push_message(&mut self, message: Message) -> &Message {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Adds a newly proposed idea.
    pub fn add_idea(&mut self, idea: Idea) -> &Idea {
        self.ideas.push(idea);
        &self.ideas[self.ideas.len() - 1]
    }

    /// Looks up an idea by id.
    pub fn idea(&self, id: &IdeaId) -> Option<&Idea> {
        self.ideas.iter().find(|idea| &idea.id == id)
    }

    /// Moves to exploration round `round`.
    ///
    /// Returns `false` and leaves the counter untouched when `round` is
    /// outside `1..=max_rounds`.
    pub fn begin_round(&mut self, round: u32) -> bool {
        if round == 0 || round > self.max_rounds {
            return false;
        }
        self.round = round;
        true
    }

    /// Applies moderator evaluations to the idea list.
    ///
    /// Each evaluation updates at most one idea, resolved by exact id, then
    /// by 1-based `idea_index`, then by exact title. Evaluations matching no
    /// idea are skipped. Returns the number of evaluations applied.
    pub fn apply_evaluations(&mut self, evaluations: &[IdeaEvaluation]) -> usize {
        let mut applied = 0;
        for eval in evaluations {
            if let Some(pos) = self.resolve_evaluation_target(eval) {
                self.ideas[pos].record_evaluation(eval.score, eval.pros.clone(), eval.cons.clone());
                applied += 1;
            }
        }
        applied
    }

    fn resolve_evaluation_target(&self, eval: &IdeaEvaluation) -> Option<usize> {
        let key = eval.idea_id.trim();
        if !key.is_empty() {
            if let Some(pos) = self.ideas.iter().position(|i| i.id.as_str() == key) {
                return Some(pos);
            }
        }
        if let Some(index) = eval.idea_index {
            if (1..=self.ideas.len()).contains(&index) {
                return Some(index - 1);
            }
        }
        if key.is_empty() {
            return None;
        }
        self.ideas.iter().position(|i| i.title.trim() == key)
    }

    /// Selects the highest-scoring idea as the final idea.
    ///
    /// Ties keep the earliest idea. With no ideas the final idea stays unset.
    pub fn select_final_idea(&mut self) -> Option<&Idea> {
        let mut best: Option<usize> = None;
        for (pos, idea) in self.ideas.iter().enumerate() {
            match best {
                Some(b) if idea.score() <= self.ideas[b].score() => {}
                _ => best = Some(pos),
            }
        }
        self.final_idea = best.map(|pos| self.ideas[pos].id.clone());
        best.map(|pos| &self.ideas[pos])
    }

    /// The selected final idea, if any.
    pub fn final_idea(&self) -> Option<&Idea> {
        self.final_idea.as_ref().and_then(|id| self.idea(id))
    }

    /// Ideas sorted by score, highest first. Equal scores keep insertion order.
    pub fn ranked_ideas(&self) -> Vec<&Idea> {
        let mut ranked: Vec<&Idea> = self.ideas.iter().collect();
        ranked.sort_by(|a, b| b.score().total_cmp(&a.score()));
        ranked
    }

    /// The `n` best ideas by score.
    pub fn top_ideas(&self, n: usize) -> Vec<&Idea> {
        let mut ranked = self.ranked_ideas();
        ranked.truncate(n);
        ranked
    }

    /// Validated ideas scoring at least `threshold`.
    pub fn ideas_meeting(&self, threshold: f64) -> Vec<&Idea> {
        self.ideas
            .iter()
            .filter(|i| i.is_validated() && i.score() >= threshold)
            .collect()
    }

    /// Content of the first visualization message, or an empty string.
    pub fn report_artifact(&self) -> &str {
        self.messages
            .iter()
            .find(|m| m.kind == MessageKind::Visualization)
            .map(|m| m.content.as_str())
            .unwrap_or("")
    }

    /// Marks the discussion completed and stamps the end time.
    pub fn complete(&mut self) {
        self.end_time = Some(Utc::now());
        self.status = DiscussionStatus::Completed;
    }

    /// Marks the discussion failed. The end time stays unset.
    pub fn fail(&mut self) {
        self.status = DiscussionStatus::Failed;
    }
}
