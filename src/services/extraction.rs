//! Strict JSON extraction from oracle replies.
//!
//! Shared by the rank extractor and the phishing synthesizer. The only
//! leniency is surrounding whitespace and one enclosing markdown code fence;
//! anything else that is not a single JSON object is rejected.

use serde_json::{Map, Value};

use crate::utils::error::ExtractionError;

/// Remove one enclosing ``` fence (with optional language tag), if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop the info string (e.g. "json") on the opening line
    match inner.split_once('\n') {
        Some((info, body)) if info.trim().chars().all(|c| c.is_ascii_alphanumeric()) => body.trim(),
        _ => inner.trim(),
    }
}

/// Parse `text` as exactly one JSON object.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, ExtractionError> {
    if text.trim().is_empty() {
        return Err(ExtractionError::empty());
    }
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ExtractionError::empty());
    }
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ExtractionError::malformed(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(ExtractionError::malformed(format!("invalid JSON: {}", e))),
    }
}

/// A present, non-blank string field.
pub fn require_string(map: &Map<String, Value>, field: &str) -> Result<String, ExtractionError> {
    match map.get(field) {
        None | Some(Value::Null) => Err(ExtractionError::missing_field(field)),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ExtractionError::missing_field(field)),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(other) => Err(ExtractionError::malformed(format!(
            "field '{}' must be a string, got {}",
            field,
            json_type_name(other)
        ))),
    }
}

/// An integer score in [1, 10]. Floats with no fractional part are accepted.
pub fn require_score(map: &Map<String, Value>, field: &str) -> Result<u8, ExtractionError> {
    let value = match map.get(field) {
        None | Some(Value::Null) => return Err(ExtractionError::missing_field(field)),
        Some(Value::Number(n)) => n,
        Some(other) => {
            return Err(ExtractionError::malformed(format!(
                "field '{}' must be an integer, got {}",
                field,
                json_type_name(other)
            )))
        }
    };

    let score = if let Some(i) = value.as_i64() {
        i
    } else {
        match value.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => f as i64,
            _ => {
                return Err(ExtractionError::malformed(format!(
                    "field '{}' must be an integer, got {}",
                    field, value
                )))
            }
        }
    };

    if !(1..=10).contains(&score) {
        return Err(ExtractionError::out_of_range(field, score));
    }
    Ok(score as u8)
}

/// An array of strings (possibly empty).
pub fn require_string_list(map: &Map<String, Value>, field: &str) -> Result<Vec<String>, ExtractionError> {
    let items = match map.get(field) {
        None | Some(Value::Null) => return Err(ExtractionError::missing_field(field)),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(ExtractionError::malformed(format!(
                "field '{}' must be a list of strings, got {}",
                field,
                json_type_name(other)
            )))
        }
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Ok(s.trim().to_string()),
            other => Err(ExtractionError::malformed(format!(
                "field '{}' must contain only strings, found {}",
                field,
                json_type_name(other)
            ))),
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
