//! Field mappings exchanged with the text-generation service
//!
//! A `FieldMap` keeps keys in the order the service returned them, which is
//! the order fields are listed in the extraction prompt and the order
//! replacements are applied.

use serde_json::Value;
use thiserror::Error;

pub type FieldMap = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum ResponseError {
    #[error("Malformed service response: {reason}")]
    Malformed { reason: String },
}

/// Strip surrounding whitespace and a markdown code fence from a reply.
///
/// Handles a leading ```` ```json ```` or bare ```` ``` ```` and a trailing
/// ```` ``` ````; anything else is returned trimmed and untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        body = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }
    body.trim()
}

/// Strict second step of the response contract: the fence-stripped payload
/// must be a JSON object.
pub fn parse_field_map(text: &str) -> Result<FieldMap, ResponseError> {
    let json_text = strip_code_fence(text);
    match serde_json::from_str::<Value>(json_text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ResponseError::Malformed {
            reason: format!("expected a JSON object, got {}", kind_name(&other)),
        }),
        Err(e) => Err(ResponseError::Malformed { reason: e.to_string() }),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Text form of a value as it is written into the document
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Whether a value counts as present and non-empty
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
