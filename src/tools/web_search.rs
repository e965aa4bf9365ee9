//! Web search via the DuckDuckGo Instant Answer API. No API key needed;
//! responses are short abstracts rather than full result pages, which suits
//! the snippet budget here.

use serde_json::Value;
use std::time::Duration;

use super::{query_argument, truncate_snippet, ToolSettings};

fn search_endpoint() -> String {
    std::env::var("SCOUT_SEARCH_ENDPOINT")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "https://api.duckduckgo.com/".to_string())
}

pub async fn run(args: &Value, settings: &ToolSettings) -> Result<String, String> {
    let query = query_argument(args)?;

    let response = settings
        .http
        .get(search_endpoint())
        .query(&[
            ("q", query.as_str()),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ])
        .timeout(Duration::from_millis(settings.timeout_ms))
        .send()
        .await
        .map_err(|e| format!("Search request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Search request failed: HTTP {}", status.as_u16()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| format!("Search response was not valid JSON: {}", e))?;

    match summarize_results(&body, settings.top_k) {
        Some(summary) => Ok(truncate_snippet(&summary, settings.snippet_max_chars)),
        None => Ok(format!("No results found for '{}'.", query)),
    }
}

/// Squeeze an Instant Answer payload into a short text summary: the direct
/// answer or abstract when present, otherwise the first related topics.
pub fn summarize_results(body: &Value, top_k: usize) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(answer) = non_empty_str(body, "Answer") {
        parts.push(answer.to_string());
    }

    if let Some(abstract_text) = non_empty_str(body, "AbstractText") {
        match non_empty_str(body, "Heading") {
            Some(heading) => parts.push(format!("{}: {}", heading, abstract_text)),
            None => parts.push(abstract_text.to_string()),
        }
    }

    if parts.is_empty() {
        parts.extend(related_topic_texts(body, top_k.max(1)));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

fn non_empty_str<'a>(body: &'a Value, key: &str) -> Option<&'a str> {
    body.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn related_topic_texts(body: &Value, limit: usize) -> Vec<String> {
    let mut texts = Vec::new();
    let Some(topics) = body.get("RelatedTopics").and_then(|v| v.as_array()) else {
        return texts;
    };

    for topic in topics {
        if texts.len() >= limit {
            break;
        }
        if let Some(text) = non_empty_str(topic, "Text") {
            texts.push(text.to_string());
        } else if let Some(nested) = topic.get("Topics").and_then(|v| v.as_array()) {
            // Category buckets nest one level deep
            for inner in nested {
                if texts.len() >= limit {
                    break;
                }
                if let Some(text) = non_empty_str(inner, "Text") {
                    texts.push(text.to_string());
                }
            }
        }
    }

    texts
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefers_abstract_with_heading() {
        let body = json!({
            "Heading": "Rust (programming language)",
            "AbstractText": "Rust is a systems programming language.",
            "RelatedTopics": [{"Text": "ignored"}]
        });
        let summary = summarize_results(&body, 3).unwrap();
        assert_eq!(
            summary,
            "Rust (programming language): Rust is a systems programming language."
        );
    }

    #[test]
    fn falls_back_to_related_topics() {
        let body = json!({
            "AbstractText": "",
            "RelatedTopics": [
                {"Text": "First topic."},
                {"Name": "Category", "Topics": [{"Text": "Nested topic."}]},
                {"Text": "Third topic."}
            ]
        });
        let summary = summarize_results(&body, 2).unwrap();
        assert_eq!(summary, "First topic.\nNested topic.");
    }

    #[test]
    fn empty_payload_yields_none() {
        let body = json!({"AbstractText": "", "RelatedTopics": []});
        assert!(summarize_results(&body, 1).is_none());
    }
}
