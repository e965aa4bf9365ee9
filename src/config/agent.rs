use serde::{Deserialize, Serialize};

/// Bounds on the tool-use loop. The observed demo variants used anywhere
/// from 5 to 15 calls and up to 60 seconds; both knobs stay configurable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentLimitsConfig {
    #[serde(default)]
    pub max_tool_calls: Option<u32>,
    #[serde(default)]
    pub time_budget_secs: Option<u64>,
}
