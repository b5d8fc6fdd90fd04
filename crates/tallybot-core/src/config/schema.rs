//! Configuration schema.
//!
//! Hierarchy: `Config` → `AgentConfig`, `ProviderConfig`, `ToolsConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.tallybot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub agent: AgentConfig,
    pub provider: ProviderConfig,
    pub tools: ToolsConfig,
}

// ─────────────────────────────────────────────
// Agent
// ─────────────────────────────────────────────

/// Conversation loop settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    /// LLM model identifier.
    pub model: String,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum LLM round-trips per user message.
    pub max_tool_iterations: u32,
    /// Replaces the built-in system prompt when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 2048,
            temperature: 0.7,
            max_tool_iterations: 10,
            system_prompt: None,
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Credentials and endpoint for the LLM provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Custom API base URL (overrides provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tools
// ─────────────────────────────────────────────

/// Built-in tool settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Base directory for relative paths given to file-producing tools.
    pub workspace: String,
    /// Reject paths that resolve outside `workspace`.
    pub restrict_to_workspace: bool,
    /// Model used by the HTML and plan generators.
    pub sub_model: String,
    /// Token budget for generated HTML.
    pub html_max_tokens: u32,
    /// Token budget for generated plans.
    pub plan_max_tokens: u32,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            workspace: ".".to_string(),
            restrict_to_workspace: false,
            sub_model: "claude-3-haiku-20240307".to_string(),
            html_max_tokens: 4000,
            plan_max_tokens: 2048,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.agent.max_tool_iterations, 10);
        assert_eq!(config.agent.max_tokens, 2048);
        assert!(!config.provider.is_configured());
        assert_eq!(config.tools.workspace, ".");
        assert_eq!(config.tools.html_max_tokens, 4000);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "agent": { "model": "gpt-4o-mini" }, "tools": { "restrictToWorkspace": true } }"#,
        )
        .unwrap();
        assert_eq!(config.agent.model, "gpt-4o-mini");
        assert_eq!(config.agent.temperature, 0.7);
        assert!(config.tools.restrict_to_workspace);
        assert_eq!(config.tools.sub_model, "claude-3-haiku-20240307");
    }

    #[test]
    fn test_serializes_camel_case() {
        let raw = serde_json::to_value(Config::default()).unwrap();
        assert!(raw["agent"].get("maxToolIterations").is_some());
        assert!(raw["tools"].get("subModel").is_some());
        assert!(raw["agent"].get("systemPrompt").is_none());
        assert!(raw["provider"].get("apiBase").is_none());
    }
}
