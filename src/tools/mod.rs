pub mod arxiv;
mod registry;
pub mod web_search;
pub mod wikipedia;

use serde_json::{json, Value};

pub use registry::{LookupTool, ToolRegistry, ToolSettings};

/// Function specs in the shape the chat-completion API expects.
pub fn format_tools_for_llm(registry: &ToolRegistry) -> Vec<Value> {
    registry
        .list()
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                }
            })
        })
        .collect()
}

/// Validate and invoke one tool. Failures come back as `Err(String)` so the
/// caller can feed them to the model as an inline error result.
pub async fn call_tool(
    registry: &ToolRegistry,
    tool_name: &str,
    arguments: &Value,
) -> std::result::Result<String, String> {
    registry.validate_arguments(tool_name, arguments)?;

    let tool = registry
        .get(tool_name)
        .ok_or_else(|| format!("Tool '{}' not found", tool_name))?;

    (tool.handler)(arguments, registry.settings()).await
}

/// Pull the required `query` string out of a tool argument object.
pub(crate) fn query_argument(args: &Value) -> std::result::Result<String, String> {
    args.get("query")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing required argument: query".to_string())
}

/// Cap a snippet at `max_chars` characters, on a char boundary, with an
/// ellipsis marker when anything was dropped.
pub fn truncate_snippet(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}
