use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use crate::config::Config;

use super::{arxiv, web_search, wikipedia};

/// Shared settings handed to every tool handler.
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub http: reqwest::Client,
    pub top_k: usize,
    pub snippet_max_chars: usize,
    pub timeout_ms: u64,
    pub verbose: bool,
}

impl ToolSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            top_k: config.top_k.max(1),
            snippet_max_chars: config.snippet_max_chars.max(50),
            timeout_ms: config.tool_timeout_ms.max(1_000),
            verbose: config.verbose,
        }
    }
}

type Handler = Box<
    dyn for<'a> Fn(
            &'a Value,
            &'a ToolSettings,
        ) -> Pin<Box<dyn Future<Output = std::result::Result<String, String>> + Send + 'a>>
        + Send
        + Sync,
>;

/// A named lookup callable the model may invoke. The fixed set is built
/// once at startup and never mutated afterwards.
pub struct LookupTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: Handler,
}

pub struct ToolRegistry {
    tools: BTreeMap<String, LookupTool>,
    settings: ToolSettings,
}

impl ToolRegistry {
    /// Registry with the tools the config leaves enabled.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::empty(ToolSettings::from_config(config));

        if config.tool_search {
            registry.register(LookupTool {
                name: "search".to_string(),
                description: "Search the web for current information. Returns a short \
                              text summary of the top results."
                    .to_string(),
                input_schema: query_schema("The search query"),
                handler: Box::new(|args, settings| {
                    let args = args.clone();
                    let settings = settings.clone();
                    Box::pin(async move { web_search::run(&args, &settings).await })
                }),
            });
        }

        if config.tool_arxiv {
            registry.register(LookupTool {
                name: "arxiv".to_string(),
                description: "Look up academic papers on arXiv by topic or by paper id \
                              (e.g. 1706.03762). Returns title, authors, and abstract."
                    .to_string(),
                input_schema: query_schema("Topic keywords or an arXiv paper id"),
                handler: Box::new(|args, settings| {
                    let args = args.clone();
                    let settings = settings.clone();
                    Box::pin(async move { arxiv::run(&args, &settings).await })
                }),
            });
        }

        if config.tool_wikipedia {
            registry.register(LookupTool {
                name: "wikipedia".to_string(),
                description: "Look up a topic on Wikipedia. Returns the introduction of \
                              the best-matching article."
                    .to_string(),
                input_schema: query_schema("The topic to look up"),
                handler: Box::new(|args, settings| {
                    let args = args.clone();
                    let settings = settings.clone();
                    Box::pin(async move { wikipedia::run(&args, &settings).await })
                }),
            });
        }

        registry
    }

    pub fn empty(settings: ToolSettings) -> Self {
        Self {
            tools: BTreeMap::new(),
            settings,
        }
    }

    pub fn register(&mut self, tool: LookupTool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn get(&self, name: &str) -> Option<&LookupTool> {
        self.tools.get(name)
    }

    pub fn list(&self) -> Vec<&LookupTool> {
        self.tools.values().collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|k| k.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    pub fn validate_arguments(
        &self,
        tool_name: &str,
        arguments: &Value,
    ) -> std::result::Result<(), String> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| format!("Tool '{}' not found", tool_name))?;

        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&tool.input_schema)
            .map_err(|e| format!("Invalid tool schema: {}", e))?;

        if let Err(errors) = schema.validate(arguments) {
            let messages: Vec<String> = errors
                .map(|e| format!("{}: {}", e.instance_path, e))
                .collect();
            return Err(messages.join("; "));
        }

        Ok(())
    }
}

fn query_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": description
            }
        },
        "required": ["query"],
        "additionalProperties": false
    })
}
