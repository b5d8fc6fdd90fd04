//! Arithmetic tools: `calculate` and `calculate_percentage`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::base::{format_number, parse_params, Tool};

// ─────────────────────────────────────────────
// calculate
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
}

impl Operator {
    fn apply(self, a: f64, b: f64) -> anyhow::Result<f64> {
        Ok(match self {
            Operator::Add => a + b,
            Operator::Subtract => a - b,
            Operator::Multiply => a * b,
            Operator::Divide => {
                if b == 0.0 {
                    anyhow::bail!("Division by zero");
                }
                a / b
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct CalculateInput {
    num1: f64,
    num2: f64,
    operator: Operator,
}

/// Basic arithmetic on two numbers.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Perform a basic arithmetic operation (+, -, *, /) on two numbers. \
         Use this instead of doing arithmetic yourself."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "num1": { "type": "number", "description": "First operand" },
                "num2": { "type": "number", "description": "Second operand" },
                "operator": {
                    "type": "string",
                    "enum": ["+", "-", "*", "/"],
                    "description": "Operation to apply"
                }
            },
            "required": ["num1", "num2", "operator"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: CalculateInput = parse_params(params)?;
        let result = input.operator.apply(input.num1, input.num2)?;
        Ok(format_number(result))
    }
}

// ─────────────────────────────────────────────
// calculate_percentage
// ─────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PercentageInput {
    percentage: f64,
    base_number: f64,
}

/// `percentage`% of `base_number`.
pub struct PercentageTool;

#[async_trait]
impl Tool for PercentageTool {
    fn name(&self) -> &str {
        "calculate_percentage"
    }

    fn description(&self) -> &str {
        "Calculate a percentage of a number, e.g. 27% of 401."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "percentage": { "type": "number", "description": "The percentage, e.g. 27 for 27%" },
                "base_number": { "type": "number", "description": "The number to take the percentage of" }
            },
            "required": ["percentage", "base_number"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: PercentageInput = parse_params(params)?;
        Ok(format_number(input.percentage / 100.0 * input.base_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn test_calculate_each_operator() {
        let tool = CalculatorTool;
        for (op, expected) in [("+", "12.5"), ("-", "7.5"), ("*", "25"), ("/", "4")] {
            let out = tool
                .execute(params(json!({"num1": 10, "num2": 2.5, "operator": op})))
                .await
                .unwrap();
            assert_eq!(out, expected, "operator {op}");
        }
    }

    #[tokio::test]
    async fn test_calculate_division_by_zero() {
        let err = CalculatorTool
            .execute(params(json!({"num1": 1, "num2": 0, "operator": "/"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Division by zero");
    }

    #[tokio::test]
    async fn test_calculate_float_noise_trimmed() {
        let out = CalculatorTool
            .execute(params(json!({"num1": 0.1, "num2": 0.2, "operator": "+"})))
            .await
            .unwrap();
        assert_eq!(out, "0.3");
    }

    #[tokio::test]
    async fn test_percentage() {
        let out = PercentageTool
            .execute(params(json!({"percentage": 27, "base_number": 401})))
            .await
            .unwrap();
        assert_eq!(out, "108.27");
    }

    #[tokio::test]
    async fn test_percentage_negative_and_over_hundred() {
        let out = PercentageTool
            .execute(params(json!({"percentage": 150, "base_number": -20})))
            .await
            .unwrap();
        assert_eq!(out, "-30");
    }
}
