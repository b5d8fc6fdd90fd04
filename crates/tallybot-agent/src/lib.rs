//! Tallybot Agent: conversation loop, tools, and context builder.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, argument validation, and the built-in
//!   calculation, conversion, filesystem and generation tools
//! - **context**: System prompt and message list construction
//! - **transcript**: The conversation history and per-turn rollback
//! - **agent_loop**: The LLM ↔ tool-calling main loop

pub mod agent_loop;
pub mod context;
pub mod error;
pub mod tools;
pub mod transcript;

#[cfg(test)]
mod test_support;

pub use agent_loop::{AgentLoop, TurnState, DEFAULT_MAX_ITERATIONS};
pub use context::ContextBuilder;
pub use error::{AgentError, RegistryError, ToolError};
pub use tools::{builtin_registry, Tool, ToolRegistry, ToolResult};
pub use transcript::Transcript;
