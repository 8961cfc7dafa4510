//! Role agents and text-generation backends for Ideaforge.
//!
//! This crate defines the [`LlmClient`] capability the rest of the system
//! depends on, two interchangeable adapters for it, and the seven role
//! agents that turn a discussion snapshot plus an instruction into an
//! [`AgentResponse`].
//!
//! # Core Types
//!
//! - [`LlmClient`]: submit a prompt, get text back
//! - [`AnthropicClient`] / [`OpenAiClient`]: HTTP adapters
//! - [`BackendConfig`]: backend selection resolved from the environment
//! - [`Agent`]: the role-agent contract
//! - [`AgentResponse`]: raw text plus any extracted ideas or evaluations
//!
//! # Example
//!
//! ```ignore
//! use ideaforge_agent::{create_agent, create_client, BackendConfig};
//! use ideaforge_models::{AgentRole, Discussion};
//!
//! let client = create_client(&BackendConfig::from_env(None)?)?;
//! let ideation = create_agent(AgentRole::Ideation, client);
//!
//! let discussion = Discussion::new("reduce plastic waste", 1)?;
//! let response = ideation.process(&discussion, "Generate creative ideas").await?;
//! println!("{} ideas", response.ideas.len());
//! ```

pub mod agent;
pub mod agents;
pub mod anthropic;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod extract;
pub mod openai;
pub mod response;

// Re-export commonly used items
pub use agent::Agent;
pub use agents::{create_agent, create_team};
pub use anthropic::AnthropicClient;
pub use client::{ChatMessage, LlmClient};
pub use config::{create_client, BackendConfig, Provider};
pub use error::{AgentError, ClientError, Result};
pub use openai::OpenAiClient;
pub use response::AgentResponse;
