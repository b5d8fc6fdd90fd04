//! The outcome of one dispatched tool call.

use tallybot_core::types::Message;

use crate::error::ToolError;

/// Result of a single tool call, correlated to the call by id.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolResult {
    pub call_id: String,
    pub tool_name: String,
    pub outcome: Result<String, ToolError>,
}

impl ToolResult {
    pub fn success(call_id: impl Into<String>, tool_name: impl Into<String>, output: String) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            outcome: Ok(output),
        }
    }

    pub fn failure(call_id: impl Into<String>, tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            call_id: call_id.into(),
            tool_name: tool_name.into(),
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Text the model sees. Failures are prefixed with `Error: `.
    pub fn content(&self) -> String {
        match &self.outcome {
            Ok(output) => output.clone(),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// The tool-role transcript entry for this result.
    pub fn to_message(&self) -> Message {
        Message::tool_result(&self.call_id, self.content())
    }
}
