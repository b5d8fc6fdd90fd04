//! Unit conversion tools: `convert_temperature` and `convert_time`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::base::{format_number, parse_params, Tool};

// ─────────────────────────────────────────────
// convert_temperature
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

#[derive(Debug, Deserialize)]
struct TemperatureInput {
    value: f64,
    from_unit: TemperatureUnit,
    to_unit: TemperatureUnit,
}

fn convert_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => value * 9.0 / 5.0 + 32.0,
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => (value - 32.0) * 5.0 / 9.0,
        _ => value,
    }
}

/// Celsius ↔ Fahrenheit.
pub struct TemperatureConversionTool;

#[async_trait]
impl Tool for TemperatureConversionTool {
    fn name(&self) -> &str {
        "convert_temperature"
    }

    fn description(&self) -> &str {
        "Convert a temperature between Celsius (C) and Fahrenheit (F)."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "value": { "type": "number", "description": "The temperature value to convert" },
                "from_unit": { "type": "string", "enum": ["C", "F"], "description": "Unit to convert from" },
                "to_unit": { "type": "string", "enum": ["C", "F"], "description": "Unit to convert to" }
            },
            "required": ["value", "from_unit", "to_unit"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: TemperatureInput = parse_params(params)?;
        let result = convert_temperature(input.value, input.from_unit, input.to_unit);
        Ok(format_number(result))
    }
}

// ─────────────────────────────────────────────
// convert_time
// ─────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn seconds(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Days => 86_400.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TimeInput {
    value: f64,
    from_unit: TimeUnit,
    to_unit: TimeUnit,
}

/// Durations between seconds, minutes, hours and days.
pub struct TimeConversionTool;

#[async_trait]
impl Tool for TimeConversionTool {
    fn name(&self) -> &str {
        "convert_time"
    }

    fn description(&self) -> &str {
        "Convert a time duration between seconds, minutes, hours and days."
    }

    fn parameters(&self) -> Value {
        let units = json!(["seconds", "minutes", "hours", "days"]);
        json!({
            "type": "object",
            "properties": {
                "value": { "type": "number", "description": "The duration to convert" },
                "from_unit": { "type": "string", "enum": units, "description": "Unit to convert from" },
                "to_unit": { "type": "string", "enum": units, "description": "Unit to convert to" }
            },
            "required": ["value", "from_unit", "to_unit"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let input: TimeInput = parse_params(params)?;
        if input.from_unit == input.to_unit {
            return Ok(format_number(input.value));
        }
        let seconds = input.value * input.from_unit.seconds();
        Ok(format_number(seconds / input.to_unit.seconds()))
    }
}
