//! Error types for model validation and configuration loading.

use thiserror::Error;

use crate::role::AgentRole;

/// Errors raised while building or validating discussion configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A role the orchestrator cannot run without is not part of the team.
    #[error("team configuration is missing required role: {0}")]
    MissingRole(AgentRole),

    /// Round count outside the accepted range.
    #[error("max_rounds must be at least 1 (got {0})")]
    InvalidRounds(u32),

    /// Score threshold outside 0.0..=10.0.
    #[error("min_score_threshold must be within 0.0..=10.0 (got {0})")]
    InvalidThreshold(f64),

    /// Discussion topic was empty or whitespace.
    #[error("discussion topic must not be empty")]
    EmptyTopic,

    /// Unknown preset name.
    #[error("unknown team preset: {0} (expected default, standard, extended or full)")]
    UnknownPreset(String),

    /// Unknown role name.
    #[error("unknown agent role: {0}")]
    UnknownRole(String),

    /// No API key could be found for the selected backend.
    #[error("no API key found: {0}")]
    MissingApiKey(String),

    /// `LLM_BACKEND` named something other than anthropic or openai.
    #[error("unknown backend: {0} (expected anthropic or openai)")]
    UnknownBackend(String),

    /// A stored idea record breaks the validation invariant.
    #[error("invalid idea record: {0}")]
    InvalidIdea(String),

    /// Reading a configuration file failed.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("invalid configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::MissingRole(AgentRole::TeamLeader);
        assert_eq!(
            err.to_string(),
            "team configuration is missing required role: team_leader"
        );

        let err = ConfigError::InvalidRounds(0);
        assert_eq!(err.to_string(), "max_rounds must be at least 1 (got 0)");
    }
}
