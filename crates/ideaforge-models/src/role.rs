//! Agent roles taking part in a discussion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Role of an agent on the ideation team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Sets direction, synthesizes rounds and narrates the final selection.
    TeamLeader,
    /// Generates structured ideas.
    Ideation,
    /// Scores and validates ideas.
    Moderator,
    /// Produces the final long-form report.
    ReportWriter,
    /// Brings facts and prior art into the discussion.
    Researcher,
    /// Challenges assumptions.
    Critic,
    /// Plans practical execution.
    Implementer,
}

impl AgentRole {
    /// Every role, in team-listing order.
    pub const ALL: [AgentRole; 7] = [
        AgentRole::TeamLeader,
        AgentRole::Ideation,
        AgentRole::Moderator,
        AgentRole::Researcher,
        AgentRole::Critic,
        AgentRole::Implementer,
        AgentRole::ReportWriter,
    ];

    /// Contributors invoked during each exploration round, in priority order.
    pub const ROUND_ORDER: [AgentRole; 4] = [
        AgentRole::Researcher,
        AgentRole::Ideation,
        AgentRole::Critic,
        AgentRole::Implementer,
    ];

    /// Machine-readable name used in transcripts and configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TeamLeader => "team_leader",
            Self::Ideation => "ideation",
            Self::Moderator => "moderator",
            Self::ReportWriter => "report_writer",
            Self::Researcher => "researcher",
            Self::Critic => "critic",
            Self::Implementer => "implementer",
        }
    }

    /// Human-readable agent name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::TeamLeader => "Team Leader",
            Self::Ideation => "Ideation Specialist",
            Self::Moderator => "Moderator/Facilitator",
            Self::ReportWriter => "Report Writer",
            Self::Researcher => "Research Specialist",
            Self::Critic => "Critical Analyst",
            Self::Implementer => "Implementation Specialist",
        }
    }

    /// Whether this role takes part in exploration rounds.
    pub fn is_contributor(&self) -> bool {
        Self::ROUND_ORDER.contains(self)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentRole {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "team_leader" | "leader" => Ok(Self::TeamLeader),
            "ideation" => Ok(Self::Ideation),
            "moderator" => Ok(Self::Moderator),
            "report_writer" | "ui_creator" | "report" => Ok(Self::ReportWriter),
            "researcher" => Ok(Self::Researcher),
            "critic" => Ok(Self::Critic),
            "implementer" => Ok(Self::Implementer),
            other => Err(ConfigError::UnknownRole(other.to_string())),
        }
    }
}
