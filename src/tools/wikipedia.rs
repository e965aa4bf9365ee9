//! Encyclopedia lookup via the MediaWiki action API: a title search first,
//! then the plain-text introduction of the best match.

use serde_json::Value;
use std::time::Duration;

use super::{query_argument, truncate_snippet, ToolSettings};

fn wikipedia_endpoint() -> String {
    std::env::var("SCOUT_WIKIPEDIA_ENDPOINT")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "https://en.wikipedia.org/w/api.php".to_string())
}

pub async fn run(args: &Value, settings: &ToolSettings) -> Result<String, String> {
    let query = query_argument(args)?;
    let endpoint = wikipedia_endpoint();

    let search_body = get_json(
        settings,
        &endpoint,
        &[
            ("action", "query"),
            ("format", "json"),
            ("list", "search"),
            ("srsearch", query.as_str()),
            ("srlimit", &settings.top_k.to_string()),
        ],
    )
    .await?;

    let titles = parse_search_titles(&search_body);
    if titles.is_empty() {
        return Ok(format!("No Wikipedia article found for '{}'.", query));
    }

    let mut sections: Vec<String> = Vec::new();
    for title in &titles {
        let extract_body = get_json(
            settings,
            &endpoint,
            &[
                ("action", "query"),
                ("format", "json"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title.as_str()),
            ],
        )
        .await?;

        if let Some((title, extract)) = parse_extract(&extract_body) {
            sections.push(format!("{}: {}", title, extract));
        }
    }

    if sections.is_empty() {
        return Ok(format!("No Wikipedia article found for '{}'.", query));
    }

    Ok(truncate_snippet(
        &sections.join("\n\n"),
        settings.snippet_max_chars,
    ))
}

async fn get_json(
    settings: &ToolSettings,
    endpoint: &str,
    params: &[(&str, &str)],
) -> Result<Value, String> {
    let response = settings
        .http
        .get(endpoint)
        .query(params)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .send()
        .await
        .map_err(|e| format!("Wikipedia request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Wikipedia request failed: HTTP {}", status.as_u16()));
    }

    response
        .json()
        .await
        .map_err(|e| format!("Wikipedia response was not valid JSON: {}", e))
}

/// Titles from a `list=search` response, best match first.
pub fn parse_search_titles(body: &Value) -> Vec<String> {
    body.get("query")
        .and_then(|q| q.get("search"))
        .and_then(|s| s.as_array())
        .map(|results| {
            results
                .iter()
                .filter_map(|r| r.get("title").and_then(|t| t.as_str()))
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Title and intro text from a `prop=extracts` response.
pub fn parse_extract(body: &Value) -> Option<(String, String)> {
    let pages = body.get("query")?.get("pages")?.as_object()?;
    for page in pages.values() {
        let title = page.get("title")?.as_str()?;
        let extract = page
            .get("extract")
            .and_then(|e| e.as_str())
            .map(str::trim)
            .filter(|e| !e.is_empty())?;
        return Some((title.to_string(), extract.to_string()));
    }
    None
}
