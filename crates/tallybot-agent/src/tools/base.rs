//! Tool trait: the abstract interface every agent tool must implement.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use tallybot_core::types::ToolDefinition;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The agent loop discovers tools via `name()`, sends their schemas to the LLM
/// via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"calculate"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters (as a `serde_json::Value`).
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    /// The registry validates every call against it before `execute()` runs.
    fn parameters(&self) -> Value;

    /// Execute the tool with already-validated arguments.
    ///
    /// Returns the tool output as a string (the LLM reads this).
    /// On failure, return an `Err`; the registry turns it into an
    /// execution error for the model.
    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Deserialize the argument map into a typed input struct.
///
/// `null` values are dropped first so optional fields read as absent.
pub fn parse_params<T: DeserializeOwned>(params: HashMap<String, Value>) -> anyhow::Result<T> {
    let object: serde_json::Map<String, Value> =
        params.into_iter().filter(|(_, v)| !v.is_null()).collect();
    serde_json::from_value(Value::Object(object))
        .map_err(|e| anyhow::anyhow!("Invalid parameters: {e}"))
}

/// Render a numeric tool result.
///
/// Rounds to at most 10 decimal places and drops trailing zeros, so
/// `108.27000000000001` prints as `108.27` and `259200.0` as `259200`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{value:.10}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        // Too small for ten decimals; the shortest round-trip form keeps it.
        "0" | "-0" if value != 0.0 => value.to_string(),
        "-0" => "0".to_string(),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Input {
        value: f64,
        label: Option<String>,
    }

    #[test]
    fn test_parse_params_typed() {
        let mut params = HashMap::new();
        params.insert("value".into(), json!(2.5));
        params.insert("label".into(), json!("x"));
        let input: Input = parse_params(params).unwrap();
        assert_eq!(input.value, 2.5);
        assert_eq!(input.label.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_params_null_is_absent() {
        let mut params = HashMap::new();
        params.insert("value".into(), json!(1));
        params.insert("label".into(), Value::Null);
        let input: Input = parse_params(params).unwrap();
        assert!(input.label.is_none());
    }

    #[test]
    fn test_parse_params_wrong_type() {
        let mut params = HashMap::new();
        params.insert("value".into(), json!("ten"));
        let err = parse_params::<Input>(params).unwrap_err();
        assert!(err.to_string().starts_with("Invalid parameters"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.27 * 401.0), "108.27");
        assert_eq!(format_number(259200.0), "259200");
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(1.0 / 3.0), "0.3333333333");
        assert_eq!(format_number(f64::INFINITY), "inf");
        assert_eq!(format_number(1.0 / 1e12), "0.000000000001");
        assert_eq!(format_number(-1e-11), "-0.00000000001");
        assert_eq!(format_number(5e-8 * 0.001 / 100.0), (5e-8 * 0.001 / 100.0).to_string());
    }

    /// Verify the default `to_definition()` produces the right shape.
    #[tokio::test]
    async fn test_to_definition_default() {
        struct DummyTool;

        #[async_trait]
        impl Tool for DummyTool {
            fn name(&self) -> &str {
                "dummy"
            }
            fn description(&self) -> &str {
                "A dummy tool"
            }
            fn parameters(&self) -> Value {
                json!({
                    "type": "object",
                    "properties": {
                        "x": { "type": "number" }
                    },
                    "required": ["x"]
                })
            }
            async fn execute(&self, _params: HashMap<String, Value>) -> anyhow::Result<String> {
                Ok("done".into())
            }
        }

        let tool = DummyTool;
        let def = tool.to_definition();
        assert_eq!(def.tool_type, "function");
        assert_eq!(def.function.name, "dummy");
        assert_eq!(def.function.description, "A dummy tool");
        assert_eq!(def.function.parameters["required"][0], "x");
        assert_eq!(tool.execute(HashMap::new()).await.unwrap(), "done");
    }
}
