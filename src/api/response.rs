use serde_json::Value;

use crate::error::{Result, ScoutError};

fn first_message(response_json: &Value) -> Result<&Value> {
    response_json
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| ScoutError::Other("No message in completion response".to_string()))
}

/// Tool calls requested by a non-streaming completion, if any.
pub fn parse_tool_calls(response_json: &Value) -> Result<Option<Vec<Value>>> {
    let message = first_message(response_json)?;

    match message.get("tool_calls").and_then(|tc| tc.as_array()) {
        Some(calls) if !calls.is_empty() => Ok(Some(calls.clone())),
        _ => Ok(None),
    }
}

/// Assistant text of a non-streaming completion.
pub fn extract_content(response_json: &Value) -> Result<Option<String>> {
    let message = first_message(response_json)?;

    Ok(message
        .get("content")
        .and_then(|c| c.as_str())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string()))
}
