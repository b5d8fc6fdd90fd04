//! Agent loop: the LLM ↔ tool-calling main loop.
//!
//! Each user message starts a turn: the loop sends the transcript and the
//! tool declarations to the provider, runs any requested tool calls, appends
//! their results, and repeats until the model answers in plain text or the
//! iteration ceiling is hit. A turn that does not finish leaves the
//! transcript exactly as it was before the turn began.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use tallybot_core::config::Config;
use tallybot_core::types::{Message, ToolCall};
use tallybot_providers::{LlmProvider, LlmRequestConfig, ProviderError};

use crate::context::ContextBuilder;
use crate::error::{AgentError, RegistryError};
use crate::tools::builtin_registry;
use crate::tools::registry::ToolRegistry;
use crate::transcript::Transcript;

/// Default maximum LLM round-trips per user message.
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Answer used when the model finishes without any text.
pub const EMPTY_ANSWER_FALLBACK: &str = "Sorry, I couldn't process that.";

/// Where the current (or most recent) turn stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnState {
    /// No turn has run yet.
    Idle,
    /// Waiting on the provider.
    AwaitingLlm,
    /// Running the tool calls of the last response.
    DispatchingTools,
    /// The last turn produced an answer.
    Done,
    /// The last turn ended in an error or was cancelled.
    Failed,
}

// ─────────────────────────────────────────────
// AgentLoop
// ─────────────────────────────────────────────

/// Owns one conversation: provider handle, tools, and the transcript.
pub struct AgentLoop {
    /// LLM provider.
    provider: Arc<dyn LlmProvider>,
    /// Model to use (provider default unless overridden).
    model: String,
    /// Max LLM round-trips per user message.
    max_iterations: usize,
    /// LLM request config (temperature, max_tokens).
    request_config: LlmRequestConfig,
    /// Tool registry.
    tools: ToolRegistry,
    /// Context builder.
    context: ContextBuilder,
    transcript: Transcript,
    state: TurnState,
}

impl AgentLoop {
    /// Create a loop with default settings around `provider` and `tools`.
    pub fn new(provider: Arc<dyn LlmProvider>, tools: ToolRegistry) -> Self {
        let model = provider.default_model().to_string();
        Self {
            provider,
            model,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            request_config: LlmRequestConfig::default(),
            tools,
            context: ContextBuilder::default(),
            transcript: Transcript::new(),
            state: TurnState::Idle,
        }
    }

    /// Build a loop with the built-in tools, configured from `config`.
    pub fn from_config(provider: Arc<dyn LlmProvider>, config: &Config) -> Result<Self, RegistryError> {
        let tools = builtin_registry(provider.clone(), &config.tools)?;
        let agent = &config.agent;
        Ok(Self::new(provider, tools)
            .with_model(agent.model.clone())
            .with_max_iterations(agent.max_tool_iterations as usize)
            .with_request_config(LlmRequestConfig {
                max_tokens: agent.max_tokens,
                temperature: agent.temperature,
            })
            .with_system_prompt(agent.system_prompt.as_deref()))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the round-trip ceiling (at least 1).
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_request_config(mut self, request_config: LlmRequestConfig) -> Self {
        self.request_config = request_config;
        self
    }

    /// Replace the default instructions; `None` keeps them.
    pub fn with_system_prompt(mut self, instructions: Option<&str>) -> Self {
        self.context = ContextBuilder::new(instructions);
        self
    }

    /// Run one user message to completion and return the final answer.
    ///
    /// On error, or if the returned future is dropped before it resolves,
    /// nothing from this turn stays in the transcript and any running tool
    /// executions are aborted.
    pub async fn handle_user_message(&mut self, text: &str) -> Result<String, AgentError> {
        let tool_defs = self.tools.describe_all();
        let mut turn = self.transcript.begin_turn();
        turn.push(Message::user(text));

        for iteration in 0..self.max_iterations {
            self.state = TurnState::AwaitingLlm;
            let messages = self.context.build_messages(turn.messages());
            debug!(iteration, messages = messages.len(), model = %self.model, "LLM call");

            let response = match self
                .provider
                .chat(&messages, Some(&tool_defs), &self.model, &self.request_config)
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    error!(iteration, error = %e, "LLM call failed");
                    self.state = TurnState::Failed;
                    return Err(e.into());
                }
            };

            if let Err(e) = check_call_ids(&response.tool_calls, turn.appended()) {
                error!(iteration, error = %e, "rejected LLM response");
                self.state = TurnState::Failed;
                return Err(e.into());
            }

            if !response.has_tool_calls() {
                let answer = match response.trimmed_content() {
                    Some(text) => text.to_string(),
                    None => {
                        warn!(iteration, "LLM returned no text, using fallback answer");
                        EMPTY_ANSWER_FALLBACK.to_string()
                    }
                };
                turn.push(Message::assistant(answer.as_str()));
                turn.commit();
                self.state = TurnState::Done;
                info!(iterations = iteration + 1, "turn complete");
                return Ok(answer);
            }

            self.state = TurnState::DispatchingTools;
            debug!(iteration, calls = response.tool_calls.len(), state = ?self.state, "dispatching tool calls");

            let results = self.tools.dispatch_all(&response.tool_calls).await;
            turn.push(Message::assistant_with_calls(
                response.content,
                response.tool_calls,
            ));
            for result in &results {
                debug!(
                    tool = %result.tool_name,
                    call_id = %result.call_id,
                    success = result.is_success(),
                    "tool result"
                );
                turn.push(result.to_message());
            }
        }

        warn!(limit = self.max_iterations, "iteration ceiling reached");
        self.state = TurnState::Failed;
        Err(AgentError::LoopExceeded {
            limit: self.max_iterations,
        })
    }

    /// Forget the conversation so far.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.state = TurnState::Idle;
        info!("conversation reset");
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Get the tool registry (e.g. for listing tools).
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn state(&self) -> TurnState {
        self.state
    }
}

/// Tool call ids must be non-empty and unique within the turn.
fn check_call_ids(calls: &[ToolCall], earlier: &[Message]) -> Result<(), ProviderError> {
    let mut seen: HashSet<&str> = earlier
        .iter()
        .flat_map(|m| m.tool_calls())
        .map(|c| c.id.as_str())
        .collect();
    for call in calls {
        if call.id.is_empty() {
            return Err(ProviderError::MalformedResponse(format!(
                "tool call for '{}' has no id",
                call.name()
            )));
        }
        if !seen.insert(call.id.as_str()) {
            return Err(ProviderError::MalformedResponse(format!(
                "duplicate tool call id '{}'",
                call.id
            )));
        }
    }
    Ok(())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
