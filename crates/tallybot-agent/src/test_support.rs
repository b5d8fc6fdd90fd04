//! Scripted provider for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tallybot_core::types::{LlmResponse, Message, ToolDefinition};
use tallybot_providers::{LlmProvider, LlmRequestConfig, ProviderError};

/// One recorded `chat` call.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub had_tools: bool,
    pub tool_names: Vec<String>,
}

/// Step in a provider script.
pub enum Step {
    Reply(Result<LlmResponse, ProviderError>),
    /// Never resolves.
    Hang,
}

/// Replays canned responses in order and records every request.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<LlmResponse, ProviderError>>) -> Self {
        Self::with_steps(replies.into_iter().map(Step::Reply).collect())
    }

    pub fn with_steps(steps: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn chat(
        &self,
        messages: &[Message],
        tools: Option<&[ToolDefinition]>,
        model: &str,
        _config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            messages: messages.to_vec(),
            model: model.to_string(),
            had_tools: tools.is_some_and(|t| !t.is_empty()),
            tool_names: tools
                .unwrap_or_default()
                .iter()
                .map(|t| t.function.name.clone())
                .collect(),
        });

        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(reply)) => reply,
            Some(Step::Hang) => std::future::pending().await,
            None => Ok(LlmResponse::text("(script exhausted)")),
        }
    }

    fn default_model(&self) -> &str {
        "scripted"
    }

    fn display_name(&self) -> &str {
        "Scripted"
    }
}
