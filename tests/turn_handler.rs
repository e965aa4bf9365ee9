use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chatscout::api::{ChatTransport, RequestBody};
use chatscout::chat::{run_turn, TurnOutcome};
use chatscout::config::Config;
use chatscout::error::{Result, ScoutError};
use chatscout::models::Conversation;
use chatscout::tools::{LookupTool, ToolRegistry, ToolSettings};

/// Scripted stand-in for the hosted model: hands out queued completions
/// and records every request it sees.
struct MockTransport {
    completions: Mutex<VecDeque<Value>>,
    default_completion: Option<Value>,
    streams: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<RequestBody>>,
    complete_calls: AtomicUsize,
    stream_calls: AtomicUsize,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            completions: Mutex::new(VecDeque::new()),
            default_completion: None,
            streams: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            complete_calls: AtomicUsize::new(0),
            stream_calls: AtomicUsize::new(0),
        }
    }

    fn queue_completion(self, response: Value) -> Self {
        self.completions.lock().unwrap().push_back(response);
        self
    }

    fn with_default_completion(mut self, response: Value) -> Self {
        self.default_completion = Some(response);
        self
    }

    fn queue_stream(self, text: &str) -> Self {
        self.streams.lock().unwrap().push_back(text.to_string());
        self
    }

    fn total_network_calls(&self) -> usize {
        self.complete_calls.load(Ordering::SeqCst) + self.stream_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn complete(&self, request: &RequestBody) -> Result<Value> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .or_else(|| self.default_completion.clone())
            .ok_or_else(|| ScoutError::Other("mock transport ran out of completions".to_string()))
    }

    async fn stream_final(&self, request: &RequestBody) -> Result<String> {
        self.stream_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.streams
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ScoutError::Other("mock transport ran out of streams".to_string()))
    }
}

fn test_config(max_tool_calls: u32) -> Config {
    Config {
        api_key: Some("test-key".to_string()),
        api_endpoint: "http://localhost/v1/chat/completions".to_string(),
        model: "llama3-8b-8192".to_string(),
        system_prompt: None,
        stream_timeout: 30,
        verbose: false,
        tools_enabled: true,
        tool_search: true,
        tool_arxiv: true,
        tool_wikipedia: true,
        top_k: 1,
        snippet_max_chars: 400,
        tool_timeout_ms: 5_000,
        max_tool_calls,
        time_budget_secs: None,
    }
}

fn content_response(text: &str) -> Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": text}
        }]
    })
}

fn tool_call_response(id: &str, name: &str, arguments: &str) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": id,
                    "type": "function",
                    "function": {"name": name, "arguments": arguments}
                }]
            }
        }]
    })
}

/// Registry with a single stub tool; `invocations` counts handler runs.
fn stub_registry(
    name: &str,
    result: std::result::Result<String, String>,
    invocations: Arc<AtomicUsize>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::empty(ToolSettings::from_config(&test_config(8)));
    registry.register(LookupTool {
        name: name.to_string(),
        description: "stub".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"],
            "additionalProperties": false
        }),
        handler: Box::new(move |_args, _settings| {
            let result = result.clone();
            let invocations = invocations.clone();
            Box::pin(async move {
                invocations.fetch_add(1, Ordering::SeqCst);
                result
            })
        }),
    });
    registry
}

#[tokio::test]
async fn answer_without_tools_keeps_log_order() {
    let config = test_config(8);
    let transport = MockTransport::new().queue_stream("Paris is the capital of France.");
    let mut conversation = Conversation::new();

    let outcome = run_turn(
        &mut conversation,
        "What is the capital of France?",
        &config,
        Some(&transport),
        None,
    )
    .await;

    match outcome {
        TurnOutcome::Completed {
            answer,
            tool_calls_made,
        } => {
            assert!(answer.contains("Paris"));
            assert_eq!(tool_calls_made, 0);
        }
        TurnOutcome::MissingCredential => panic!("turn should have completed"),
    }

    let roles: Vec<&str> = conversation
        .messages()
        .iter()
        .map(|m| m.role.as_str())
        .collect();
    assert_eq!(roles, ["user", "assistant"]);
    assert_eq!(
        conversation.messages()[0].text(),
        "What is the capital of France?"
    );
    assert!(conversation.messages()[1].text().contains("Paris"));
}

#[tokio::test]
async fn missing_credential_makes_no_network_call() {
    let config = test_config(8);
    let mut conversation = Conversation::new();

    let outcome = run_turn(
        &mut conversation,
        "first question",
        &config,
        None,
        None,
    )
    .await;

    assert!(matches!(outcome, TurnOutcome::MissingCredential));
    // the user turn is recorded, no assistant turn is
    assert_eq!(conversation.messages().len(), 1);
    assert_eq!(conversation.messages()[0].role, "user");

    // a later attempt with a credential carries the refused turn as history
    let transport = MockTransport::new().queue_stream("late answer");
    run_turn(
        &mut conversation,
        "second question",
        &config,
        Some(&transport),
        None,
    )
    .await;

    assert_eq!(transport.total_network_calls(), 1);
    let requests = transport.requests.lock().unwrap();
    let texts: Vec<String> = requests[0]
        .messages
        .iter()
        .map(|m| m.text().to_string())
        .collect();
    assert!(texts.iter().any(|t| t == "first question"));
    assert!(texts.iter().any(|t| t == "second question"));
}

#[tokio::test]
async fn failing_tool_still_produces_an_answer() {
    let config = test_config(8);
    let invocations = Arc::new(AtomicUsize::new(0));
    let registry = stub_registry(
        "search",
        Err("connection reset by peer".to_string()),
        invocations.clone(),
    );
    let transport = MockTransport::new()
        .queue_completion(tool_call_response("call_1", "search", "{\"query\":\"news\"}"))
        .queue_completion(content_response(
            "I couldn't reach the search service, but here is what I know.",
        ));
    let mut conversation = Conversation::new();

    let outcome = run_turn(
        &mut conversation,
        "what's in the news?",
        &config,
        Some(&transport),
        Some(&registry),
    )
    .await;

    let TurnOutcome::Completed {
        answer,
        tool_calls_made,
    } = outcome
    else {
        panic!("turn should have completed");
    };

    assert!(!answer.is_empty());
    assert_eq!(tool_calls_made, 1);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(conversation.messages().last().unwrap().role, "assistant");

    // the failure reached the model as an inline error result
    let requests = transport.requests.lock().unwrap();
    let followup = &requests[1];
    assert!(followup
        .messages
        .iter()
        .any(|m| m.role == "tool" && m.text().contains("connection reset")));
}

#[tokio::test]
async fn tool_loop_is_bounded_and_reports_completion() {
    let config = test_config(3);
    let invocations = Arc::new(AtomicUsize::new(0));
    let registry = stub_registry("search", Ok("a result".to_string()), invocations.clone());
    // the scripted model never stops asking for another lookup
    let transport = MockTransport::new().with_default_completion(tool_call_response(
        "call_n",
        "search",
        "{\"query\":\"more\"}",
    ));
    let mut conversation = Conversation::new();

    let outcome = run_turn(
        &mut conversation,
        "an unanswerable question",
        &config,
        Some(&transport),
        Some(&registry),
    )
    .await;

    let TurnOutcome::Completed {
        answer,
        tool_calls_made,
    } = outcome
    else {
        panic!("turn should have completed");
    };

    assert!(!answer.is_empty());
    assert_eq!(tool_calls_made, 3);
    assert_eq!(invocations.load(Ordering::SeqCst), 3);
    // the bound also caps the completion rounds
    assert_eq!(transport.complete_calls.load(Ordering::SeqCst), 3);
    assert_eq!(conversation.messages().last().unwrap().role, "assistant");
}

#[tokio::test]
async fn paper_lookup_runs_tool_before_answering() {
    let config = test_config(8);
    let invocations = Arc::new(AtomicUsize::new(0));
    let registry = stub_registry(
        "arxiv",
        Ok("arXiv:1706.03762: Attention Is All You Need".to_string()),
        invocations.clone(),
    );
    let transport = MockTransport::new()
        .queue_completion(tool_call_response(
            "call_1",
            "arxiv",
            "{\"query\":\"1706.03762\"}",
        ))
        .queue_completion(content_response(
            "The paper introduces the Transformer architecture.",
        ));
    let mut conversation = Conversation::new();

    let outcome = run_turn(
        &mut conversation,
        "summarize arXiv paper 1706.03762",
        &config,
        Some(&transport),
        Some(&registry),
    )
    .await;

    let TurnOutcome::Completed {
        answer,
        tool_calls_made,
    } = outcome
    else {
        panic!("turn should have completed");
    };

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(tool_calls_made, 1);
    assert!(answer.contains("Transformer"));
    assert_eq!(conversation.messages().len(), 2);
}

#[tokio::test]
async fn malformed_completion_becomes_an_apology_turn() {
    let config = test_config(8);
    let invocations = Arc::new(AtomicUsize::new(0));
    let registry = stub_registry("search", Ok("unused".to_string()), invocations);
    let transport = MockTransport::new().queue_completion(json!({"unexpected": true}));
    let mut conversation = Conversation::new();

    let outcome = run_turn(
        &mut conversation,
        "hello",
        &config,
        Some(&transport),
        Some(&registry),
    )
    .await;

    let TurnOutcome::Completed { answer, .. } = outcome else {
        panic!("turn should have completed");
    };

    assert!(answer.starts_with("Sorry"));
    let roles: Vec<&str> = conversation
        .messages()
        .iter()
        .map(|m| m.role.as_str())
        .collect();
    assert_eq!(roles, ["user", "assistant"]);
}
