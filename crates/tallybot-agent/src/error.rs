//! Error types for the agent crate.
//!
//! Tool-level errors ([`ToolError`]) are recovered inside a turn and fed
//! back to the model. [`AgentError`] ends the turn and reaches the caller.

use tallybot_providers::ProviderError;
use thiserror::Error;

use crate::tools::schema::FieldError;

/// Registration failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),
}

/// Why a single tool call did not produce a result.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ToolError {
    #[error("Tool '{name}' not found")]
    UnknownTool { name: String },

    #[error("Invalid arguments for tool '{tool}': {}", describe_fields(.problems))]
    InvalidArguments {
        tool: String,
        problems: Vec<FieldError>,
    },

    #[error("Error executing {tool}: {message}")]
    Execution { tool: String, message: String },
}

fn describe_fields(problems: &[FieldError]) -> String {
    problems
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failures that terminate a turn.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("LLM call failed: {0}")]
    Adapter(#[from] ProviderError),

    #[error("no final answer after {limit} LLM round-trips")]
    LoopExceeded { limit: usize },
}

impl AgentError {
    /// Text suitable for showing to the end user in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Adapter(ProviderError::RateLimited(_)) => {
                "Sorry, the language model is rate limiting requests right now. Please try again shortly.".into()
            }
            AgentError::Adapter(e) => {
                format!("Sorry, I couldn't reach the language model ({e}).")
            }
            AgentError::LoopExceeded { .. } => {
                "Sorry, I couldn't resolve that in a few steps.".into()
            }
        }
    }
}
