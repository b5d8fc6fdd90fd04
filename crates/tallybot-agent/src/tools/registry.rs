//! Tool Registry: name-indexed store of tools plus call dispatch.
//!
//! The agent loop registers tools here and dispatches LLM tool-call requests
//! by name. Each execution runs on its own tokio task so a panicking tool
//! surfaces as an execution error instead of taking the process down.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tallybot_core::types::{ToolCall, ToolDefinition};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use super::base::Tool;
use super::result::ToolResult;
use super::schema::{parse_arguments, validate_arguments, FieldError};
use crate::error::{RegistryError, ToolError};

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools in registration order and dispatches calls.
///
/// Owns `Arc<dyn Tool>` so executions can move onto spawned tasks.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. A second tool with the same name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(RegistryError::DuplicateTool(name));
        }
        info!(tool = %name, "registered tool");
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names of all registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// LLM-facing definitions for every tool, in registration order.
    pub fn describe_all(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute one tool call. Never fails; problems come back as a failed
    /// [`ToolResult`] carrying the call's id.
    pub async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        self.start(call).finish().await
    }

    /// Execute several calls concurrently and return results in request order.
    ///
    /// Dropping the returned future aborts any executions still running.
    pub async fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let pending: Vec<Pending> = calls.iter().map(|call| self.start(call)).collect();
        let mut results = Vec::with_capacity(pending.len());
        for p in pending {
            results.push(p.finish().await);
        }
        results
    }

    /// Resolve, validate and spawn a call without waiting for it.
    fn start(&self, call: &ToolCall) -> Pending {
        let name = call.name();
        let prepared = self.prepare(call);
        match prepared {
            Ok((tool, params)) => {
                debug!(tool = name, call_id = %call.id, "executing tool call");
                let handle = tokio::spawn(async move { tool.execute(params).await });
                Pending::Running {
                    call_id: call.id.clone(),
                    tool_name: name.to_string(),
                    task: AbortOnDrop(handle),
                }
            }
            Err(e) => {
                warn!(tool = name, call_id = %call.id, error = %e, "tool call rejected");
                Pending::Ready(ToolResult::failure(&call.id, name, e))
            }
        }
    }

    fn prepare(
        &self,
        call: &ToolCall,
    ) -> Result<(Arc<dyn Tool>, HashMap<String, Value>), ToolError> {
        let name = call.name();
        let tool = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;

        let invalid = |problems: Vec<FieldError>| ToolError::InvalidArguments {
            tool: name.to_string(),
            problems,
        };
        let args = parse_arguments(&call.function.arguments).map_err(|e| invalid(vec![e]))?;
        validate_arguments(&tool.parameters(), &args).map_err(invalid)?;

        Ok((Arc::clone(tool), args.into_iter().collect()))
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────
// In-flight executions
// ─────────────────────────────────────────────

/// Aborts the task when dropped before completion.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> AbortOnDrop<T> {
    async fn join(mut self) -> Result<T, JoinError> {
        (&mut self.0).await
    }
}

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

enum Pending {
    Ready(ToolResult),
    Running {
        call_id: String,
        tool_name: String,
        task: AbortOnDrop<anyhow::Result<String>>,
    },
}

impl Pending {
    async fn finish(self) -> ToolResult {
        let (call_id, tool_name, task) = match self {
            Pending::Ready(result) => return result,
            Pending::Running {
                call_id,
                tool_name,
                task,
            } => (call_id, tool_name, task),
        };

        let message = match task.join().await {
            Ok(Ok(output)) => {
                debug!(tool = %tool_name, call_id = %call_id, "tool call succeeded");
                return ToolResult::success(call_id, tool_name, output);
            }
            Ok(Err(e)) => e.to_string(),
            Err(e) => describe_join_error(e),
        };

        warn!(tool = %tool_name, call_id = %call_id, error = %message, "tool execution failed");
        let error = ToolError::Execution {
            tool: tool_name.clone(),
            message,
        };
        ToolResult::failure(call_id, tool_name, error)
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return "execution was cancelled".to_string();
    }
    let payload = err.into_panic();
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("tool panicked: {detail}")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
