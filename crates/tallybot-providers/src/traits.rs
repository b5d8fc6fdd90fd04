//! LLM Provider trait: the boundary between the conversation loop and a
//! concrete chat completions API.

use async_trait::async_trait;
use tallybot_core::types::{LlmResponse, Message, ToolDefinition};
use thiserror::Error;

/// Configuration passed to each LLM call.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

/// Why a provider call failed.
///
/// The conversation loop treats every variant the same way (the turn fails);
/// the split exists for logs and user-facing wording.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// HTTP 429.
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    /// Any other non-success HTTP status.
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The body could not be decoded into a usable response.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Trait that all LLM providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages`: Conversation history in OpenAI format.
    /// * `tools`: Optional list of tool definitions the LLM can call.
    /// * `model`: Model identifier (e.g. `"claude-3-5-haiku-latest"`, `"gpt-4o"`).
    /// * `config`: Temperature, max_tokens, etc.
    ///
    /// # Returns
    /// An `LlmResponse` with content and/or tool calls in the order the
    /// model produced them.
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// The default model for this provider instance.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
