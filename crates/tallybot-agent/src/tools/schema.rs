//! Argument validation against a tool's declared JSON Schema.
//!
//! Supports the subset the built-in tools declare: an object with
//! `properties`, `required`, per-property `type` and `enum`. Undeclared
//! properties are rejected unless the schema sets `additionalProperties: true`.
//! A `null` value counts as absent.

use serde_json::{Map, Value};
use std::fmt;

/// What is wrong with one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldProblem {
    Missing,
    WrongType { expected: String, found: &'static str },
    NotAllowed(Vec<String>),
    Unexpected,
    /// The argument payload itself could not be read as a JSON object.
    Malformed(String),
}

/// A problem attached to a field name.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub problem: FieldProblem,
}

impl FieldError {
    pub fn new(field: impl Into<String>, problem: FieldProblem) -> Self {
        Self {
            field: field.into(),
            problem,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            FieldProblem::Missing => write!(f, "{}: missing required field", self.field),
            FieldProblem::WrongType { expected, found } => {
                write!(f, "{}: expected {expected}, got {found}", self.field)
            }
            FieldProblem::NotAllowed(allowed) => {
                write!(f, "{}: must be one of {}", self.field, allowed.join(", "))
            }
            FieldProblem::Unexpected => write!(f, "{}: unexpected field", self.field),
            FieldProblem::Malformed(reason) => write!(f, "{}: {reason}", self.field),
        }
    }
}

/// Parse a raw argument string into an object.
///
/// Blank input is treated as `{}` since some providers send an empty string
/// for calls without arguments.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, FieldError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(FieldError::new(
            "arguments",
            FieldProblem::Malformed(format!("expected a JSON object, got {}", json_type(&other))),
        )),
        Err(e) => Err(FieldError::new(
            "arguments",
            FieldProblem::Malformed(format!("not valid JSON ({e})")),
        )),
    }
}

/// Check `args` against `schema`, collecting every problem found.
pub fn validate_arguments(schema: &Value, args: &Map<String, Value>) -> Result<(), Vec<FieldError>> {
    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);
    let allow_extra = schema
        .get("additionalProperties")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let mut problems = Vec::new();

    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str);
    for name in required {
        if args.get(name).map_or(true, Value::is_null) {
            problems.push(FieldError::new(name, FieldProblem::Missing));
        }
    }

    for (name, value) in args {
        if value.is_null() {
            continue;
        }
        let Some(prop) = properties.get(name) else {
            if !allow_extra {
                problems.push(FieldError::new(name, FieldProblem::Unexpected));
            }
            continue;
        };
        if let Some(problem) = check_property(prop, value) {
            problems.push(FieldError::new(name, problem));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

fn check_property(prop: &Value, value: &Value) -> Option<FieldProblem> {
    if let Some(expected) = prop.get("type").and_then(Value::as_str) {
        if !matches_type(expected, value) {
            return Some(FieldProblem::WrongType {
                expected: expected.to_string(),
                found: json_type(value),
            });
        }
    }

    let allowed = prop.get("enum").and_then(Value::as_array)?;
    if allowed.contains(value) {
        None
    } else {
        Some(FieldProblem::NotAllowed(
            allowed
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ))
    }
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calc_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "num1": { "type": "number" },
                "num2": { "type": "number" },
                "operator": { "type": "string", "enum": ["+", "-", "*", "/"] },
                "note": { "type": "string" }
            },
            "required": ["num1", "num2", "operator"]
        })
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_valid_arguments() {
        let result = validate_arguments(
            &calc_schema(),
            &args(json!({"num1": 4, "num2": 2.5, "operator": "*"})),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_and_wrong_type_reported_together() {
        let problems = validate_arguments(
            &calc_schema(),
            &args(json!({"num1": "401", "operator": "+"})),
        )
        .unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems.contains(&FieldError::new("num2", FieldProblem::Missing)));
        assert!(problems.contains(&FieldError::new(
            "num1",
            FieldProblem::WrongType {
                expected: "number".into(),
                found: "string"
            }
        )));
    }

    #[test]
    fn test_enum_violation() {
        let problems = validate_arguments(
            &calc_schema(),
            &args(json!({"num1": 1, "num2": 2, "operator": "^"})),
        )
        .unwrap_err();
        assert_eq!(problems[0].field, "operator");
        assert!(problems[0].to_string().contains("must be one of +, -, *, /"));
    }

    #[test]
    fn test_null_counts_as_absent() {
        let problems = validate_arguments(
            &calc_schema(),
            &args(json!({"num1": 1, "num2": null, "operator": "+", "note": null})),
        )
        .unwrap_err();
        assert_eq!(problems, vec![FieldError::new("num2", FieldProblem::Missing)]);
    }

    #[test]
    fn test_unexpected_field_rejected() {
        let problems = validate_arguments(
            &calc_schema(),
            &args(json!({"num1": 1, "num2": 2, "operator": "+", "precision": 3})),
        )
        .unwrap_err();
        assert_eq!(problems, vec![FieldError::new("precision", FieldProblem::Unexpected)]);
    }

    #[test]
    fn test_additional_properties_allowed() {
        let schema = json!({"type": "object", "properties": {}, "additionalProperties": true});
        assert!(validate_arguments(&schema, &args(json!({"anything": 1}))).is_ok());
    }

    #[test]
    fn test_integer_type() {
        let schema = json!({"type": "object", "properties": {"n": {"type": "integer"}}});
        assert!(validate_arguments(&schema, &args(json!({"n": 3}))).is_ok());
        assert!(validate_arguments(&schema, &args(json!({"n": 3.0}))).is_ok());
        assert!(validate_arguments(&schema, &args(json!({"n": 3.5}))).is_err());
    }

    #[test]
    fn test_parse_arguments() {
        assert!(parse_arguments("").unwrap().is_empty());
        assert_eq!(parse_arguments(r#"{"a": 1}"#).unwrap()["a"], 1);

        let err = parse_arguments("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, got array"));

        let err = parse_arguments("{not json").unwrap_err();
        assert_eq!(err.field, "arguments");
        assert!(err.to_string().contains("not valid JSON"));
    }
}
