//! Error types for the agent crate.

use ideaforge_models::{AgentRole, ConfigError};
use thiserror::Error;

/// Failure talking to a text-generation backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The backend answered with a non-success HTTP status.
    #[error("API error (status {status}): {body}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The request never completed (connection, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The response envelope could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Errors that can occur in agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    /// A role agent's backend call failed.
    #[error("{role} generation failed: {source}")]
    Generation {
        /// Role whose call failed.
        role: AgentRole,
        /// Underlying backend error.
        #[source]
        source: ClientError,
    },

    /// Backend settings could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backend configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AgentError {
    /// Role that produced the error, if it came from a role agent.
    pub fn role(&self) -> Option<AgentRole> {
        match self {
            Self::Generation { role, .. } => Some(*role),
            Self::Config(_) | Self::Configuration(_) => None,
        }
    }
}

/// Result type for agent operations.
pub type Result<T> = std::result::Result<T, AgentError>;
