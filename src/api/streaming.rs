use colored::*;
use futures::StreamExt;
use std::io::{self, Write};
use tokio::time::{timeout, Duration};

use crate::api::models::StreamResponse;
use crate::error::{Result, ScoutError};
use crate::ui::highlight::CodeBuffer;

const FLUSH_INTERVAL: Duration = Duration::from_millis(50);

/// Render an SSE chat-completion stream to stdout as it arrives and return
/// the accumulated assistant text. A stall longer than `timeout_secs`
/// between chunks aborts the stream.
pub async fn process_streaming_response(
    response: reqwest::Response,
    timeout_secs: u64,
    verbose: bool,
) -> Result<String> {
    let mut stream = response.bytes_stream();
    let mut pending = String::new();
    let mut code_buffer = CodeBuffer::new();
    let mut assistant_response = String::new();
    let mut last_flush = std::time::Instant::now();
    let chunk_timeout = Duration::from_secs(timeout_secs);

    loop {
        let chunk = match timeout(chunk_timeout, stream.next()).await {
            Ok(Some(chunk)) => chunk?,
            Ok(None) => break,
            Err(_) => {
                eprintln!(
                    "{}",
                    format!(
                        "Error: no data received for {} seconds, giving up on this stream",
                        timeout_secs
                    )
                    .red()
                );
                finish_render(&mut code_buffer)?;
                return Err(ScoutError::Timeout);
            }
        };

        pending.push_str(&String::from_utf8_lossy(&chunk));

        // Only complete lines carry a full SSE field.
        while let Some(newline) = pending.find('\n') {
            let line = pending[..newline].trim_end().to_string();
            pending.drain(..=newline);

            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let Some(value) = line.strip_prefix("data:").map(str::trim_start) else {
                if verbose {
                    eprintln!("{}", format!("[scout] SSE: {}", line).dimmed());
                }
                continue;
            };

            if value == "[DONE]" {
                finish_render(&mut code_buffer)?;
                return Ok(assistant_response);
            }

            match serde_json::from_str::<StreamResponse>(value) {
                Ok(parsed) => {
                    for choice in parsed.choices.unwrap_or_default() {
                        let Some(content) = choice.delta.and_then(|d| d.content) else {
                            continue;
                        };
                        assistant_response.push_str(&content);

                        let rendered = code_buffer.append(&content);
                        if !rendered.is_empty() {
                            print!("{}", rendered);
                            if last_flush.elapsed() > FLUSH_INTERVAL {
                                io::stdout().flush()?;
                                last_flush = std::time::Instant::now();
                            }
                        }
                    }
                }
                Err(e) => {
                    if verbose {
                        eprintln!("{}", format!("[scout] JSON parse error: {}", e).dimmed());
                    }
                }
            }
        }
    }

    // Stream ended without [DONE]
    finish_render(&mut code_buffer)?;
    Ok(assistant_response)
}

fn finish_render(code_buffer: &mut CodeBuffer) -> Result<()> {
    let remaining = code_buffer.flush();
    if !remaining.is_empty() {
        print!("{}", remaining.trim_end());
    }
    println!();
    io::stdout().flush()?;
    Ok(())
}
