use colored::*;
use serde_json::Value;
use std::time::{Duration, Instant};

use crate::api::{extract_content, parse_tool_calls, ChatTransport, RequestBody};
use crate::error::Result;
use crate::models::{Message, ToolCall};
use crate::tools::{call_tool, format_tools_for_llm, ToolRegistry};
use crate::ui;

/// What one run of the decision loop produced.
pub struct AgentOutcome {
    pub final_text: String,
    pub tool_calls_made: u32,
}

#[derive(Debug, Clone)]
pub struct AgentLimits {
    pub max_tool_calls: u32,
    pub time_budget: Option<Duration>,
}

/// The bounded request/tool/request loop. Each round asks the model for a
/// completion with the tool specs attached; requested tool calls are
/// executed (failures become inline error results) and fed back until the
/// model answers in plain text or a bound is hit.
pub struct ToolLoopAgent<'a> {
    pub transport: &'a dyn ChatTransport,
    pub registry: Option<&'a ToolRegistry>,
    pub model: String,
    pub limits: AgentLimits,
    pub verbose: bool,
}

impl<'a> ToolLoopAgent<'a> {
    pub async fn run(&self, messages: &mut Vec<Message>) -> Result<AgentOutcome> {
        let registry = match self.registry {
            Some(registry) if !registry.is_empty() => registry,
            // No tools: a single streamed answer is all there is to do.
            _ => return self.stream_plain_answer(messages).await,
        };

        let tool_specs = format_tools_for_llm(registry);
        let started = Instant::now();
        let mut calls_made: u32 = 0;

        loop {
            if let Some(reason) = self.exhausted(calls_made, started) {
                let final_text = bounded_completion_message(&reason, calls_made);
                ui::display_content(&final_text);
                return Ok(AgentOutcome {
                    final_text,
                    tool_calls_made: calls_made,
                });
            }

            let request = RequestBody {
                model: self.model.clone(),
                messages: messages.clone(),
                stream: false,
                tools: Some(tool_specs.clone()),
            };

            if self.verbose {
                eprintln!(
                    "{}",
                    format!(
                        "[scout] Requesting completion ({} messages, {} tool calls so far)",
                        messages.len(),
                        calls_made
                    )
                    .dimmed()
                );
            }

            let response = self.transport.complete(&request).await?;

            let Some(tool_calls) = parse_tool_calls(&response)? else {
                // Model is done with tools; take its text, or stream a
                // follow-up when the message came back empty.
                if let Some(content) = extract_content(&response)? {
                    ui::display_content(&content);
                    return Ok(AgentOutcome {
                        final_text: content,
                        tool_calls_made: calls_made,
                    });
                }
                let final_text = self.stream_followup(messages).await?;
                return Ok(AgentOutcome {
                    final_text,
                    tool_calls_made: calls_made,
                });
            };

            messages.push(assistant_tool_message(&response, &tool_calls));

            for tool_call in &tool_calls {
                if self.exhausted(calls_made, started).is_some() {
                    // Bound hit mid-batch: refuse the rest, top of loop ends it.
                    if let Some(id) = tool_call.get("id").and_then(|i| i.as_str()) {
                        messages.push(Message::tool_result(
                            id,
                            "Error: tool-call budget exhausted",
                        ));
                    }
                    continue;
                }
                messages.push(self.execute_tool_call(registry, tool_call, calls_made).await);
                calls_made += 1;
            }
        }
    }

    async fn stream_plain_answer(&self, messages: &mut Vec<Message>) -> Result<AgentOutcome> {
        let request = RequestBody {
            model: self.model.clone(),
            messages: messages.clone(),
            stream: true,
            tools: None,
        };
        let final_text = self.transport.stream_final(&request).await?;
        Ok(AgentOutcome {
            final_text,
            tool_calls_made: 0,
        })
    }

    /// Stream the closing answer once tool results are in the window.
    async fn stream_followup(&self, messages: &mut Vec<Message>) -> Result<String> {
        if self.verbose {
            eprintln!(
                "{}",
                "[scout] Streaming final answer without tools".dimmed()
            );
        }
        let request = RequestBody {
            model: self.model.clone(),
            messages: messages.clone(),
            stream: true,
            tools: None,
        };
        self.transport.stream_final(&request).await
    }

    fn exhausted(&self, calls_made: u32, started: Instant) -> Option<String> {
        if calls_made >= self.limits.max_tool_calls {
            return Some(format!("{} tool calls", self.limits.max_tool_calls));
        }
        if let Some(budget) = self.limits.time_budget {
            if started.elapsed() >= budget {
                return Some(format!("{} seconds", budget.as_secs()));
            }
        }
        None
    }

    /// Run one requested call. Anything that goes wrong is folded into the
    /// tool result string so the loop keeps going.
    async fn execute_tool_call(
        &self,
        registry: &ToolRegistry,
        tool_call: &Value,
        ordinal: u32,
    ) -> Message {
        let call_id = tool_call
            .get("id")
            .and_then(|i| i.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("missing-id-{}", ordinal));

        let Some(name) = tool_call
            .get("function")
            .and_then(|f| f.get("name"))
            .and_then(|n| n.as_str())
        else {
            eprintln!(
                "{}",
                "Warning: malformed tool call without a function name".yellow()
            );
            return Message::tool_result(call_id, "Error: tool call missing function name");
        };

        let arguments_str = tool_call
            .get("function")
            .and_then(|f| f.get("arguments"))
            .and_then(|a| a.as_str())
            .unwrap_or("{}");

        let arguments: Value = match serde_json::from_str(arguments_str) {
            Ok(arguments) => arguments,
            Err(err) => {
                let error_text = format!(
                    "Error: failed to parse arguments for tool '{}': {}",
                    name, err
                );
                ui::display_tool_error(name, &error_text);
                return Message::tool_result(call_id, error_text);
            }
        };

        ui::display_tool_call(name, &arguments);

        match call_tool(registry, name, &arguments).await {
            Ok(result_text) => {
                ui::display_tool_result(name, &result_text);
                Message::tool_result(call_id, result_text)
            }
            Err(e) => {
                let error_text = format!("Error: {}", e);
                ui::display_tool_error(name, &error_text);
                Message::tool_result(call_id, error_text)
            }
        }
    }
}

fn assistant_tool_message(response: &Value, tool_calls: &[Value]) -> Message {
    let content = response
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string());

    let typed: Vec<ToolCall> = tool_calls
        .iter()
        .filter_map(|tc| serde_json::from_value(tc.clone()).ok())
        .collect();

    Message {
        role: "assistant".to_string(),
        content,
        tool_calls: (!typed.is_empty()).then_some(typed),
        tool_call_id: None,
    }
}

fn bounded_completion_message(reason: &str, calls_made: u32) -> String {
    format!(
        "I couldn't finish answering within the allotted budget ({}). \
         I made {} lookup call(s) but the question needs more than that; \
         try narrowing it or raising the limits.",
        reason, calls_made
    )
}
