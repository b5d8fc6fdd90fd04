//! Context builder: constructs the system prompt and the message list sent
//! on every LLM round-trip.

use chrono::Local;
use tallybot_core::types::Message;

/// Default instructions for the assistant.
const DEFAULT_INSTRUCTIONS: &str = "\
You are Tallybot, a concise assistant with access to tools.

Use the calculation and conversion tools for any arithmetic, percentage, \
temperature or time question instead of working the numbers out yourself, \
and report the tool's result exactly. Use the file tools when the user asks \
for a directory, an HTML page or a written plan.

If a tool returns an error, fix the arguments and try again, or explain the \
problem to the user.";

/// Builds the system prompt and conversation message lists for the agent loop.
#[derive(Clone, Debug)]
pub struct ContextBuilder {
    system_prompt: String,
}

impl ContextBuilder {
    /// Use `instructions` in place of the default ones when given.
    pub fn new(instructions: Option<&str>) -> Self {
        let today = Local::now().format("%Y-%m-%d");
        let instructions = instructions.unwrap_or(DEFAULT_INSTRUCTIONS);
        Self {
            system_prompt: format!("{instructions}\n\nToday's date: {today}"),
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// System prompt followed by the conversation so far.
    pub fn build_messages(&self, history: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(self.system_prompt.as_str()));
        messages.extend_from_slice(history);
        messages
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new(None)
    }
}
