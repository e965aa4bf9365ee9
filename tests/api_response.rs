use chatscout::api::response::{extract_content, parse_tool_calls};
use serde_json::json;

#[test]
fn test_extract_content_with_content() {
    let response = json!({
        "choices": [{
            "message": {
                "content": "Paris is the capital of France.",
                "role": "assistant"
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, Some("Paris is the capital of France.".to_string()));
}

#[test]
fn test_extract_content_without_content() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant"
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, None);
}

#[test]
fn test_extract_content_treats_blank_as_absent() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "   "
            }
        }]
    });

    let content = extract_content(&response).unwrap();
    assert_eq!(content, None);
}

#[test]
fn test_extract_content_empty_choices() {
    let response = json!({
        "choices": []
    });

    let result = extract_content(&response);
    assert!(result.is_err());
}

#[test]
fn test_parse_tool_calls_with_tools() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": [
                    {
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "wikipedia",
                            "arguments": "{\"query\": \"Paris\"}"
                        }
                    }
                ]
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    assert!(tool_calls.is_some());
    let calls = tool_calls.unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["id"], "call_123");
}

#[test]
fn test_parse_tool_calls_without_tools() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "No tools needed"
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    assert!(tool_calls.is_none());
}

#[test]
fn test_parse_tool_calls_empty_array() {
    let response = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "tool_calls": []
            }
        }]
    });

    let tool_calls = parse_tool_calls(&response).unwrap();
    assert!(tool_calls.is_none());
}

#[test]
fn test_missing_message_is_an_error() {
    let response = json!({"choices": [{}]});
    assert!(parse_tool_calls(&response).is_err());
    assert!(extract_content(&response).is_err());
}
