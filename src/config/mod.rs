mod agent;
mod api;
mod defaults;
mod tools;

use crate::cli::Args;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

pub use agent::AgentLimitsConfig;
pub use api::ApiConfig;
pub use defaults::*;
pub use tools::ToolsConfig;

/// Model identifiers the hosted endpoint is known to serve. Unknown names
/// are allowed through with a warning so new models work without a release.
pub const KNOWN_MODELS: &[&str] = &[
    "llama3-8b-8192",
    "llama3-70b-8192",
    "llama-3.1-8b-instant",
    "llama-3.3-70b-versatile",
    "mixtral-8x7b-32768",
    "gemma2-9b-it",
];

pub fn is_known_model(name: &str) -> bool {
    KNOWN_MODELS.contains(&name)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub default_model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

pub struct Config {
    pub api_key: Option<String>,
    pub api_endpoint: String,
    pub model: String,
    pub system_prompt: Option<String>,
    pub stream_timeout: u64,
    pub verbose: bool,
    pub tools_enabled: bool,
    pub tool_search: bool,
    pub tool_arxiv: bool,
    pub tool_wikipedia: bool,
    pub top_k: usize,
    pub snippet_max_chars: usize,
    pub tool_timeout_ms: u64,
    pub max_tool_calls: u32,
    pub time_budget_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct YamlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub agent: AgentLimitsConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self, String> {
        let yaml = YamlConfig::load().unwrap_or_default();

        // The credential may be absent; turns are refused until one shows up.
        let api_key = args
            .api_key
            .clone()
            .or_else(|| env::var("GROQ_API_KEY").ok())
            .filter(|k| !k.trim().is_empty());

        // API endpoint: CLI args > env var > config file > default
        let api_endpoint = args
            .api_endpoint
            .clone()
            .or_else(|| env::var("SCOUT_API_ENDPOINT").ok())
            .or(yaml.api.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint))
            .unwrap_or_else(|| {
                "https://api.groq.com/openai/v1/chat/completions".to_string()
            });

        let model = args
            .model
            .clone()
            .or_else(|| env::var("SCOUT_MODEL").ok())
            .or(yaml.model.default_model.clone())
            .unwrap_or_else(|| "llama3-8b-8192".to_string());

        let system_prompt = env::var("SCOUT_SYSTEM_PROMPT")
            .ok()
            .or(yaml.model.system_prompt.clone());

        let stream_timeout = env::var("SCOUT_STREAM_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .or(yaml.api.stream_timeout)
            .unwrap_or_else(default_stream_timeout);

        let verbose = args.verbose
            || env::var("SCOUT_VERBOSE")
                .ok()
                .map(|v| v == "true" || v == "1")
                .or(yaml.session.verbose)
                .unwrap_or(false);

        let tools_enabled = if args.no_tools {
            false
        } else {
            match env::var("SCOUT_TOOLS_ENABLED").ok() {
                Some(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
                None => yaml.tools.enabled,
            }
        };

        let max_tool_calls = args
            .max_tool_calls
            .or_else(|| {
                env::var("SCOUT_MAX_TOOL_CALLS")
                    .ok()
                    .and_then(|s| s.parse::<u32>().ok())
            })
            .or(yaml.agent.max_tool_calls)
            .unwrap_or_else(default_max_tool_calls);

        let time_budget_secs = args
            .time_budget
            .or_else(|| {
                env::var("SCOUT_TIME_BUDGET")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
            })
            .or(yaml.agent.time_budget_secs)
            .filter(|&secs| secs > 0);

        Ok(Config {
            api_key,
            api_endpoint,
            model,
            system_prompt,
            stream_timeout,
            verbose,
            tools_enabled,
            tool_search: yaml.tools.search,
            tool_arxiv: yaml.tools.arxiv,
            tool_wikipedia: yaml.tools.wikipedia,
            top_k: yaml.tools.top_k.unwrap_or_else(default_top_k),
            snippet_max_chars: yaml
                .tools
                .snippet_max_chars
                .unwrap_or_else(default_snippet_max_chars),
            tool_timeout_ms: yaml.tools.timeout_ms.unwrap_or_else(default_tool_timeout_ms),
            max_tool_calls,
            time_budget_secs,
        })
    }

    /// Date line for the system prompt, so the model knows "today".
    pub fn current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }

    pub fn default_system_prompt(&self) -> String {
        let date_line = format!("Today's date is {}.", Self::current_date());
        let role_line = "You are a helpful research assistant. Use the available lookup \
                         tools when a question needs fresh or factual information; answer \
                         directly when you already know.";
        match &self.system_prompt {
            Some(prompt) => format!("{}\n\n{}\n\n{}", date_line, role_line, prompt),
            None => format!("{}\n\n{}", date_line, role_line),
        }
    }
}

/// Accept a bare host, a /v1 base, or a full chat-completions URL.
pub fn normalize_endpoint(endpoint: &str) -> String {
    if endpoint.ends_with("/chat/completions") {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/chat/completions", endpoint)
    } else if endpoint.ends_with("/v1/") {
        format!("{}chat/completions", endpoint)
    } else {
        format!("{}/v1/chat/completions", endpoint.trim_end_matches('/'))
    }
}

impl YamlConfig {
    pub fn load() -> Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(YamlConfig::default())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: YamlConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Local override first
        paths.push(PathBuf::from(".scout.yaml"));
        paths.push(PathBuf::from(".scout.yml"));

        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("scout");
            paths.push(config_dir.join("scout.yaml"));
            paths.push(config_dir.join("scout.yml"));
        }

        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalization_variants() {
        assert_eq!(
            normalize_endpoint("https://api.groq.com/openai/v1"),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(
            normalize_endpoint("http://localhost:11434/v1/"),
            "http://localhost:11434/v1/chat/completions"
        );
        assert_eq!(
            normalize_endpoint("https://example.com/v1/chat/completions"),
            "https://example.com/v1/chat/completions"
        );
        assert_eq!(
            normalize_endpoint("https://example.com/"),
            "https://example.com/v1/chat/completions"
        );
    }

    #[test]
    fn yaml_config_parses_partial_documents() {
        let yaml = r#"
model:
  default_model: llama3-70b-8192
tools:
  wikipedia: false
  snippet_max_chars: 200
agent:
  max_tool_calls: 5
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.model.default_model.as_deref(), Some("llama3-70b-8192"));
        assert!(config.tools.enabled);
        assert!(config.tools.search);
        assert!(!config.tools.wikipedia);
        assert_eq!(config.tools.snippet_max_chars, Some(200));
        assert_eq!(config.agent.max_tool_calls, Some(5));
        assert_eq!(config.agent.time_budget_secs, None);
    }

    #[test]
    fn known_model_list_contains_default() {
        assert!(is_known_model("llama3-8b-8192"));
        assert!(!is_known_model("made-up-model"));
    }
}
