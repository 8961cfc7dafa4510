//! Transcript messages exchanged during a discussion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::ids::MessageId;
use crate::role::AgentRole;

/// Sender or recipient of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Participant {
    /// The orchestrator itself.
    System,
    /// Broadcast to the whole team.
    Team,
    /// A specific agent.
    Agent(AgentRole),
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => f.write_str("system"),
            Self::Team => f.write_str("team"),
            Self::Agent(role) => write!(f, "{}", role),
        }
    }
}

impl From<AgentRole> for Participant {
    fn from(role: AgentRole) -> Self {
        Self::Agent(role)
    }
}

impl From<Participant> for String {
    fn from(p: Participant) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Participant {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "system" => Ok(Self::System),
            "team" => Ok(Self::Team),
            other => other.parse::<AgentRole>().map(Self::Agent),
        }
    }
}

/// Type tag of a transcript message.
///
/// Contribution steps tag their message with the contributing role's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum MessageKind {
    Kickoff,
    Idea,
    Request,
    Validation,
    Selection,
    Synthesis,
    Visualization,
    Response,
    Question,
    Summary,
    /// Round contribution from a specific role.
    Contribution(AgentRole),
}

impl MessageKind {
    /// Tag string as stored in the transcript.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kickoff => "kickoff",
            Self::Idea => "idea",
            Self::Request => "request",
            Self::Validation => "validation",
            Self::Selection => "selection",
            Self::Synthesis => "synthesis",
            Self::Visualization => "visualization",
            Self::Response => "response",
            Self::Question => "question",
            Self::Summary => "summary",
            Self::Contribution(role) => role.as_str(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "kickoff" => Self::Kickoff,
            "idea" => Self::Idea,
            "request" => Self::Request,
            "validation" => Self::Validation,
            "selection" => Self::Selection,
            "synthesis" => Self::Synthesis,
            "visualization" => Self::Visualization,
            "response" => Self::Response,
            "question" => Self::Question,
            "summary" => Self::Summary,
            other => Self::Contribution(other.parse()?),
        })
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        kind.as_str().to_string()
    }
}

impl TryFrom<String> for MessageKind {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A single entry of the discussion transcript.
///
/// Messages are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier.
    pub id: MessageId,

    /// Sender.
    pub from: Participant,

    /// Recipient.
    pub to: Participant,

    /// Free-text content; may itself be markup or JSON.
    pub content: String,

    /// When the message was appended.
    pub timestamp: DateTime<Utc>,

    /// Type tag.
    #[serde(rename = "type")]
    pub kind: MessageKind,
}

impl Message {
    /// Create a new message with the current timestamp.
    pub fn new(
        from: impl Into<Participant>,
        to: impl Into<Participant>,
        content: impl Into<String>,
        kind: MessageKind,
    ) -> Self {
        Self {
            id: MessageId::new(),
            from: from.into(),
            to: to.into(),
            content: content.into(),
            timestamp: Utc::now(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_display() {
        assert_eq!(Participant::System.to_string(), "system");
        assert_eq!(Participant::Team.to_string(), "team");
        assert_eq!(Participant::Agent(AgentRole::Critic).to_string(), "critic");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(MessageKind::Kickoff.as_str(), "kickoff");
        assert_eq!(
            MessageKind::Contribution(AgentRole::Researcher).as_str(),
            "researcher"
        );
        assert_eq!(
            "ideation".parse::<MessageKind>().unwrap(),
            MessageKind::Contribution(AgentRole::Ideation)
        );
        assert!("bogus".parse::<MessageKind>().is_err());
    }

    #[test]
    fn test_message_json_shape() {
        let msg = Message::new(
            AgentRole::Ideation,
            Participant::Team,
            "three ideas",
            MessageKind::Contribution(AgentRole::Ideation),
        );
        let value = serde_json::to_value(&msg).unwrap();

        assert_eq!(value["from"], "ideation");
        assert_eq!(value["to"], "team");
        assert_eq!(value["type"], "ideation");

        let parsed: Message = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, msg);
    }
}
