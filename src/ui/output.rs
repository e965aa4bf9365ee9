use colored::*;
use serde_json::Value;

use crate::models::Conversation;
use crate::ui::highlight::CodeBuffer;

/// Render assistant text with fenced-code highlighting.
pub fn display_content(content: &str) {
    let mut code_buffer = CodeBuffer::new();
    let formatted = code_buffer.append(content);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
    let remaining = code_buffer.flush();
    if !remaining.is_empty() {
        print!("{}", remaining.trim_end());
    }
    println!();
}

/// Announce a tool invocation as it happens.
pub fn display_tool_call(name: &str, arguments: &Value) {
    let preview = arguments
        .get("query")
        .and_then(|q| q.as_str())
        .unwrap_or("...");
    println!("{}", format!("Calling {}({})...", name, preview).cyan());
}

pub fn display_tool_result(name: &str, result: &str) {
    let sep = if result.ends_with('\n') { "" } else { "\n" };
    render_block(&format!("```TOOL: {}\n{}{}\n```", name, result, sep));
}

pub fn display_tool_error(name: &str, error: &str) {
    let sep = if error.ends_with('\n') { "" } else { "\n" };
    render_block(&format!("```TOOL ERROR: {}\n{}{}\n```", name, error, sep));
}

fn render_block(block: &str) {
    let mut code_buffer = CodeBuffer::new();
    let formatted = code_buffer.append(block);
    if !formatted.is_empty() {
        print!("{}", formatted);
    }
    let remaining = code_buffer.flush();
    if !remaining.is_empty() {
        print!("{}", remaining.trim_end());
    }
    println!();
}

pub fn warn_missing_credential() {
    eprintln!(
        "{}",
        "No API key found. Pass --api-key, set GROQ_API_KEY, or use /key <value>.".yellow()
    );
}

pub fn warn_unknown_model(model: &str) {
    eprintln!(
        "{}",
        format!(
            "Warning: model '{}' is not in the known list; trying it anyway.",
            model
        )
        .yellow()
    );
}

pub fn banner(model: &str, tool_names: &[&str]) {
    println!(
        "{}",
        "Hi, I'm a chatbot that can search the web. Ask me anything.".green()
    );
    if tool_names.is_empty() {
        println!("{}", format!("model: {} | tools: disabled", model).dimmed());
    } else {
        println!(
            "{}",
            format!("model: {} | tools: {}", model, tool_names.join(", ")).dimmed()
        );
    }
    println!(
        "{}",
        "Commands: /history /new /key <value> /quit".dimmed()
    );
}

/// Replay the conversation so far, oldest first.
pub fn display_history(conversation: &Conversation) {
    if conversation.is_empty() {
        println!("{}", "No turns yet.".dimmed());
        return;
    }
    for message in conversation.messages() {
        match message.role.as_str() {
            "user" => println!("{} {}", "you:".bold(), message.text()),
            _ => {
                println!("{}", "scout:".bold());
                display_content(message.text());
            }
        }
    }
}

pub fn prompt() {
    use std::io::Write;
    print!("{} ", ">".bold());
    let _ = std::io::stdout().flush();
}
