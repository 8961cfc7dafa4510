//! Team configuration: which roles take part and how the discussion runs.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::idea::MAX_SCORE;
use crate::role::AgentRole;

/// Declarative recipe for a discussion.
///
/// The team leader and report writer are part of every preset. The leader
/// is required by [`TeamConfig::validate`]; the report writer may be left
/// out, which skips the report phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamConfig {
    pub include_team_leader: bool,
    pub include_report_writer: bool,
    pub include_ideation: bool,
    pub include_moderator: bool,
    pub include_researcher: bool,
    pub include_critic: bool,
    pub include_implementer: bool,

    /// Number of exploration rounds.
    pub max_rounds: u32,

    /// Minimum number of ideas requested from the ideation agent.
    pub min_ideas: u32,

    /// Ask contributors for deeper, more probing analysis.
    pub deep_dive: bool,

    /// Score an idea must reach to count as a strong candidate.
    pub min_score_threshold: f64,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl TeamConfig {
    /// Four-agent team: leader, ideation, moderator, report writer. One round.
    pub fn standard() -> Self {
        Self {
            include_team_leader: true,
            include_report_writer: true,
            include_ideation: true,
            include_moderator: true,
            include_researcher: false,
            include_critic: false,
            include_implementer: false,
            max_rounds: 1,
            min_ideas: 3,
            deep_dive: false,
            min_score_threshold: 6.0,
        }
    }

    /// Six-agent team adding researcher and critic. Two rounds.
    pub fn extended() -> Self {
        Self {
            include_researcher: true,
            include_critic: true,
            max_rounds: 2,
            min_ideas: 4,
            deep_dive: true,
            min_score_threshold: 7.0,
            ..Self::standard()
        }
    }

    /// All seven agents. Three rounds.
    pub fn full() -> Self {
        Self {
            include_implementer: true,
            max_rounds: 3,
            min_ideas: 5,
            min_score_threshold: 7.5,
            ..Self::extended()
        }
    }

    /// Only the team leader, with no contributors. Starting point for free-form teams.
    pub fn leader_only() -> Self {
        Self {
            include_team_leader: true,
            include_report_writer: false,
            include_ideation: false,
            include_moderator: false,
            include_researcher: false,
            include_critic: false,
            include_implementer: false,
            ..Self::standard()
        }
    }

    /// Looks up a preset by name.
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "default" | "standard" => Ok(Self::standard()),
            "extended" => Ok(Self::extended()),
            "full" => Ok(Self::full()),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Parses a configuration from YAML. Missing fields take the standard preset's values.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Includes or excludes a role.
    pub fn with_role(mut self, role: AgentRole, included: bool) -> Self {
        *self.flag_mut(role) = included;
        self
    }

    /// Sets the number of rounds.
    pub fn with_max_rounds(mut self, rounds: u32) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Sets the minimum number of requested ideas.
    pub fn with_min_ideas(mut self, min_ideas: u32) -> Self {
        self.min_ideas = min_ideas;
        self
    }

    /// Enables or disables deep-dive mode.
    pub fn with_deep_dive(mut self, deep_dive: bool) -> Self {
        self.deep_dive = deep_dive;
        self
    }

    /// Sets the strong-candidate score threshold.
    pub fn with_min_score_threshold(mut self, threshold: f64) -> Self {
        self.min_score_threshold = threshold;
        self
    }

    /// Whether `role` is part of the team.
    pub fn includes(&self, role: AgentRole) -> bool {
        match role {
            AgentRole::TeamLeader => self.include_team_leader,
            AgentRole::ReportWriter => self.include_report_writer,
            AgentRole::Ideation => self.include_ideation,
            AgentRole::Moderator => self.include_moderator,
            AgentRole::Researcher => self.include_researcher,
            AgentRole::Critic => self.include_critic,
            AgentRole::Implementer => self.include_implementer,
        }
    }

    fn flag_mut(&mut self, role: AgentRole) -> &mut bool {
        match role {
            AgentRole::TeamLeader => &mut self.include_team_leader,
            AgentRole::ReportWriter => &mut self.include_report_writer,
            AgentRole::Ideation => &mut self.include_ideation,
            AgentRole::Moderator => &mut self.include_moderator,
            AgentRole::Researcher => &mut self.include_researcher,
            AgentRole::Critic => &mut self.include_critic,
            AgentRole::Implementer => &mut self.include_implementer,
        }
    }

    /// Active roles in team-listing order.
    pub fn active_roles(&self) -> Vec<AgentRole> {
        AgentRole::ALL
            .into_iter()
            .filter(|role| self.includes(*role))
            .collect()
    }

    /// Number of agents on the team.
    pub fn team_size(&self) -> usize {
        self.active_roles().len()
    }

    /// Checks the configuration before any agent is created.
    pub fn validate(&self) -> Result<()> {
        if !self.include_team_leader {
            return Err(ConfigError::MissingRole(AgentRole::TeamLeader));
        }
        if self.max_rounds == 0 {
            return Err(ConfigError::InvalidRounds(self.max_rounds));
        }
        if !(0.0..=MAX_SCORE).contains(&self.min_score_threshold) {
            return Err(ConfigError::InvalidThreshold(self.min_score_threshold));
        }
        Ok(())
    }
}
