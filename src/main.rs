use clap::Parser;
use colored::*;
use std::process;

use chatscout::api::{ChatTransport, HttpChatTransport};
use chatscout::chat::{self, TurnOutcome};
use chatscout::cli::Args;
use chatscout::config::{self, Config};
use chatscout::models::Conversation;
use chatscout::tools::ToolRegistry;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if !config::is_known_model(&config.model) {
        chatscout::ui::warn_unknown_model(&config.model);
    }

    let registry = config
        .tools_enabled
        .then(|| ToolRegistry::from_config(&config))
        .filter(|r| !r.is_empty());

    if config.verbose {
        match &registry {
            Some(registry) => eprintln!(
                "{}",
                format!("[scout] Tools: {}", registry.names().join(", ")).dimmed()
            ),
            None => eprintln!("{}", "[scout] Tools: disabled".dimmed()),
        }
    }

    let result = if args.question.is_empty() {
        chat::repl(config, registry.as_ref()).await
    } else {
        run_one_shot(&config, registry.as_ref(), args.question.join(" ")).await
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red(), e);
        process::exit(1);
    }
}

async fn run_one_shot(
    config: &Config,
    registry: Option<&ToolRegistry>,
    question: String,
) -> chatscout::error::Result<()> {
    let transport = match config.api_key.as_deref() {
        Some(key) => Some(HttpChatTransport::new(
            key,
            config.api_endpoint.clone(),
            config.stream_timeout,
            config.verbose,
        )?),
        None => None,
    };

    let mut conversation = Conversation::new();
    let outcome = chat::run_turn(
        &mut conversation,
        &question,
        config,
        transport.as_ref().map(|t| t as &dyn ChatTransport),
        registry,
    )
    .await;

    match outcome {
        TurnOutcome::Completed { .. } => Ok(()),
        TurnOutcome::MissingCredential => process::exit(1),
    }
}
