//! Paper lookup against the arXiv Atom API (`export.arxiv.org/api/query`).
//! Parsing stays deliberately minimal: title, authors, date, abstract.

use serde_json::Value;
use std::time::Duration;

use super::{query_argument, truncate_snippet, ToolSettings};

fn arxiv_endpoint() -> String {
    std::env::var("SCOUT_ARXIV_ENDPOINT")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "https://export.arxiv.org/api/query".to_string())
}

#[derive(Debug, Clone, Default)]
pub struct ArxivEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub authors: Vec<String>,
    pub published: Option<String>,
}

pub async fn run(args: &Value, settings: &ToolSettings) -> Result<String, String> {
    let query = query_argument(args)?;

    let mut url = reqwest::Url::parse(&arxiv_endpoint())
        .map_err(|e| format!("Invalid arXiv endpoint: {}", e))?;
    {
        let mut pairs = url.query_pairs_mut();
        if looks_like_arxiv_id(&query) {
            pairs.append_pair("id_list", &query);
        } else {
            pairs.append_pair("search_query", &build_search_query(&query));
            pairs.append_pair("sortBy", "relevance");
        }
        pairs.append_pair("start", "0");
        pairs.append_pair("max_results", &settings.top_k.to_string());
    }

    let response = settings
        .http
        .get(url)
        .timeout(Duration::from_millis(settings.timeout_ms))
        .send()
        .await
        .map_err(|e| format!("arXiv request failed: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("arXiv request failed: HTTP {}", status.as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| format!("arXiv response could not be read: {}", e))?;

    let entries = parse_atom(&body)?;
    if entries.is_empty() {
        return Ok(format!("No arXiv results for '{}'.", query));
    }

    let formatted: Vec<String> = entries.iter().map(format_entry).collect();
    Ok(truncate_snippet(
        &formatted.join("\n\n"),
        settings.snippet_max_chars,
    ))
}

/// Modern arXiv ids look like `1706.03762`, optionally with a version tag.
pub fn looks_like_arxiv_id(query: &str) -> bool {
    let core = match query.rfind('v') {
        Some(pos) if query[pos + 1..].chars().all(|c| c.is_ascii_digit())
            && !query[pos + 1..].is_empty() =>
        {
            &query[..pos]
        }
        _ => query,
    };

    let Some((left, right)) = core.split_once('.') else {
        return false;
    };
    left.len() == 4
        && (4..=5).contains(&right.len())
        && left.chars().all(|c| c.is_ascii_digit())
        && right.chars().all(|c| c.is_ascii_digit())
}

fn build_search_query(query: &str) -> String {
    // Quote multi-word queries so arXiv treats them as a phrase.
    if query.contains(' ') {
        format!("all:\"{}\"", query.replace('"', ""))
    } else {
        format!("all:{}", query)
    }
}

fn format_entry(entry: &ArxivEntry) -> String {
    let mut out = format!("arXiv:{}: {}", entry.id, entry.title);
    if !entry.authors.is_empty() {
        out.push_str(&format!("\nAuthors: {}", entry.authors.join(", ")));
    }
    if let Some(published) = &entry.published {
        out.push_str(&format!("\nPublished: {}", published));
    }
    if !entry.summary.is_empty() {
        out.push_str(&format!("\n{}", entry.summary));
    }
    out
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn id_from_entry_url(url: &str) -> String {
    match url.rfind("/abs/") {
        Some(pos) => url[pos + "/abs/".len()..].trim_matches('/').to_string(),
        None => url.to_string(),
    }
}

/// Pull the entries out of an Atom feed. Namespace prefixes vary, so tags
/// are matched by suffix.
pub fn parse_atom(body: &str) -> Result<Vec<ArxivEntry>, String> {
    let mut reader = quick_xml::Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut entries: Vec<ArxivEntry> = Vec::new();
    let mut buf = Vec::new();

    let mut in_entry = false;
    let mut in_author = false;
    let mut text = String::new();
    let mut current = ArxivEntry::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Eof) => break,
            Ok(quick_xml::events::Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                text.clear();
                if name.ends_with("entry") {
                    in_entry = true;
                    current = ArxivEntry::default();
                } else if in_entry && name.ends_with("author") {
                    in_author = true;
                }
            }
            Ok(quick_xml::events::Event::Text(t)) => {
                let chunk = t.unescape().map(|c| c.to_string()).unwrap_or_default();
                text.push_str(&chunk);
            }
            Ok(quick_xml::events::Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if in_entry {
                    let value = normalize_ws(&text);
                    if name.ends_with("id") {
                        current.id = id_from_entry_url(&value);
                    } else if name.ends_with("title") {
                        current.title = value;
                    } else if name.ends_with("summary") {
                        current.summary = value;
                    } else if name.ends_with("published") {
                        current.published = (!value.is_empty()).then_some(value);
                    } else if in_author && name.ends_with("name") && !value.is_empty() {
                        current.authors.push(value);
                    }

                    if name.ends_with("author") {
                        in_author = false;
                    } else if name.ends_with("entry") {
                        in_entry = false;
                        entries.push(std::mem::take(&mut current));
                    }
                }
                text.clear();
            }
            Err(e) => return Err(format!("arXiv feed could not be parsed: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(entries)
}
