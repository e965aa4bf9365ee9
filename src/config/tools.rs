use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Per-tool switches plus the shared lookup knobs. The result caps mirror
/// the hosted demo this replaces: top_k results per lookup, snippets cut to
/// a fixed character budget before they reach the model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_tools_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tool_enabled")]
    pub search: bool,
    #[serde(default = "default_tool_enabled")]
    pub arxiv: bool,
    #[serde(default = "default_tool_enabled")]
    pub wikipedia: bool,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub snippet_max_chars: Option<usize>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_tools_enabled(),
            search: true,
            arxiv: true,
            wikipedia: true,
            top_k: None,
            snippet_max_chars: None,
            timeout_ms: None,
        }
    }
}
