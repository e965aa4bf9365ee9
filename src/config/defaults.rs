pub fn default_tools_enabled() -> bool {
    true
}

pub fn default_tool_enabled() -> bool {
    true
}

pub fn default_max_tool_calls() -> u32 {
    8
}

pub fn default_stream_timeout() -> u64 {
    30
}

pub fn default_top_k() -> usize {
    1
}

pub fn default_snippet_max_chars() -> usize {
    400
}

pub fn default_tool_timeout_ms() -> u64 {
    10_000
}
