use colored::*;
use std::io::{self, BufRead};
use std::time::Duration;

use crate::agent::{AgentLimits, ToolLoopAgent};
use crate::api::{ChatTransport, HttpChatTransport};
use crate::config::Config;
use crate::error::Result;
use crate::models::{Conversation, MAX_HISTORY_PAIRS};
use crate::tools::ToolRegistry;
use crate::ui;

pub enum TurnOutcome {
    Completed {
        answer: String,
        tool_calls_made: u32,
    },
    /// No credential was available; the turn was refused before any
    /// network traffic. The user's text stays in the log.
    MissingCredential,
}

/// Handle one user submission: record the user turn, then produce and
/// record exactly one assistant turn.
///
/// Ordering decision: the user turn goes into the log before the
/// credential check, so a refused turn is carried as history once a key
/// arrives. Decision-loop failures never escape; they become an apology
/// string recorded as the assistant turn.
pub async fn run_turn(
    conversation: &mut Conversation,
    user_text: &str,
    config: &Config,
    transport: Option<&dyn ChatTransport>,
    registry: Option<&ToolRegistry>,
) -> TurnOutcome {
    conversation.push_user(user_text);

    let Some(transport) = transport else {
        ui::warn_missing_credential();
        return TurnOutcome::MissingCredential;
    };

    let mut window = conversation.window(&config.default_system_prompt(), MAX_HISTORY_PAIRS);

    let agent = ToolLoopAgent {
        transport,
        registry,
        model: config.model.clone(),
        limits: AgentLimits {
            max_tool_calls: config.max_tool_calls,
            time_budget: config.time_budget_secs.map(Duration::from_secs),
        },
        verbose: config.verbose,
    };

    match agent.run(&mut window).await {
        Ok(outcome) => {
            conversation.push_assistant(outcome.final_text.clone());
            TurnOutcome::Completed {
                answer: outcome.final_text,
                tool_calls_made: outcome.tool_calls_made,
            }
        }
        Err(e) => {
            if config.verbose {
                eprintln!("{}", format!("[scout] Turn failed: {}", e).dimmed());
            }
            let apology = format!("Sorry, I couldn't complete that request: {}", e);
            ui::display_content(&apology);
            conversation.push_assistant(apology.clone());
            TurnOutcome::Completed {
                answer: apology,
                tool_calls_made: 0,
            }
        }
    }
}

fn build_transport(config: &Config) -> Result<Option<HttpChatTransport>> {
    config
        .api_key
        .as_deref()
        .map(|key| {
            HttpChatTransport::new(
                key,
                config.api_endpoint.clone(),
                config.stream_timeout,
                config.verbose,
            )
        })
        .transpose()
}

/// The interactive chat surface. Reads one line per turn and blocks until
/// the full answer has been rendered before accepting the next.
pub async fn repl(mut config: Config, registry: Option<&ToolRegistry>) -> Result<()> {
    let mut conversation = Conversation::new();
    let mut transport = build_transport(&config)?;

    let tool_names: Vec<&str> = registry.map(|r| r.names()).unwrap_or_default();
    ui::banner(&config.model, &tool_names);
    if config.api_key.is_none() {
        ui::warn_missing_credential();
    }
    if config.verbose {
        eprintln!(
            "{}",
            format!("[scout] Conversation {}", conversation.id()).dimmed()
        );
    }

    let stdin = io::stdin();
    loop {
        ui::prompt();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit", _) | ("/exit", _) => break,
            ("/new", _) => {
                conversation = Conversation::new();
                println!("{}", "Started a new conversation.".green());
            }
            ("/history", _) => ui::display_history(&conversation),
            ("/key", value) => {
                let value = value.trim();
                if value.is_empty() {
                    println!("{}", "Usage: /key <api-key>".yellow());
                    continue;
                }
                config.api_key = Some(value.to_string());
                transport = build_transport(&config)?;
                println!("{}", "API key updated.".green());
            }
            (command, _) if command.starts_with('/') => {
                println!(
                    "{}",
                    format!("Unknown command '{}'. Try /history, /new, /key, /quit.", command)
                        .yellow()
                );
            }
            _ => {
                run_turn(
                    &mut conversation,
                    input,
                    &config,
                    transport.as_ref().map(|t| t as &dyn ChatTransport),
                    registry,
                )
                .await;
            }
        }
    }

    Ok(())
}
