use colored::*;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Style, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};
use terminal_size::{terminal_size, Width};

const THEME: &str = "Solarized (dark)";

/// Incremental renderer for streamed markdown-ish text. Fenced code blocks
/// are framed and syntax-highlighted; everything else passes through as-is.
///
/// Text is emitted as soon as it can no longer open a fence: fence markers
/// only count at the start of a line, so once a line has started flowing
/// through, the rest of it is passed along unbuffered.
pub struct CodeBuffer {
    pending: String,
    mid_line: bool,
    in_fence: bool,
    fence_lang: Option<String>,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self {
            pending: String::new(),
            mid_line: false,
            in_fence: false,
            fence_lang: None,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
        }
    }

    pub fn append(&mut self, chunk: &str) -> String {
        self.pending.push_str(chunk);
        let mut out = String::new();

        while let Some(newline) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=newline).collect();

            if self.mid_line {
                // Tail of a line already flowing through
                out.push_str(&line);
                self.mid_line = false;
                continue;
            }

            if self.in_fence {
                if line.trim_end().starts_with("```") {
                    out.push_str(&self.close_fence());
                } else {
                    out.push_str(&self.highlight_line(&line));
                }
            } else if let Some(marker) = line.trim_end().strip_prefix("```") {
                out.push_str(&self.open_fence(marker));
            } else {
                out.push_str(&line);
            }
        }

        if !self.pending.is_empty() && !self.in_fence && !self.could_open_fence() {
            out.push_str(&self.pending);
            self.pending.clear();
            self.mid_line = true;
        }

        out
    }

    pub fn flush(&mut self) -> String {
        let mut out = String::new();

        if self.in_fence {
            if !self.pending.is_empty() {
                let line = std::mem::take(&mut self.pending);
                out.push_str(&self.highlight_line(&line));
                if !line.ends_with('\n') {
                    out.push('\n');
                }
            }
            out.push_str(&self.close_fence());
        } else {
            out.push_str(&self.pending);
        }

        self.pending.clear();
        self.mid_line = false;
        self.in_fence = false;
        self.fence_lang = None;

        out
    }

    /// An incomplete line that might still become a ``` marker must be held.
    fn could_open_fence(&self) -> bool {
        if self.mid_line || !self.pending.starts_with('`') {
            return false;
        }
        let backticks = self.pending.chars().take_while(|&c| c == '`').count();
        backticks == self.pending.chars().count() || self.pending.starts_with("```")
    }

    fn open_fence(&mut self, marker: &str) -> String {
        let lang = marker.trim();
        self.fence_lang = (!lang.is_empty()).then(|| lang.to_string());
        self.in_fence = true;

        let label = self.fence_lang.as_deref().unwrap_or("code");
        format!(
            "{}{}{}{}\n",
            "┌─[".dimmed(),
            label.cyan(),
            "]".dimmed(),
            rule_tail(label.chars().count() + 4).dimmed()
        )
    }

    fn close_fence(&mut self) -> String {
        self.in_fence = false;
        self.fence_lang = None;
        format!("{}{}\n", "└".dimmed(), rule_tail(1).dimmed())
    }

    fn highlight_line(&self, line: &str) -> String {
        let theme = &self.theme_set.themes[THEME];
        let syntax = self
            .fence_lang
            .as_deref()
            .and_then(|lang| {
                self.syntax_set
                    .find_syntax_by_token(lang)
                    .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::new();
        for piece in LinesWithEndings::from(line) {
            match highlighter.highlight_line(piece, &self.syntax_set) {
                Ok(ranges) => {
                    output.push_str(&as_24_bit_terminal_escaped(&ranges[..], false));
                }
                Err(_) => output.push_str(piece),
            }
        }
        output
    }
}

impl Default for CodeBuffer {
    fn default() -> Self {
        Self::new()
    }
}

fn rule_width() -> usize {
    let cols = terminal_size().map(|(Width(w), _)| w as usize).unwrap_or(80);
    cols.min(72)
}

fn rule_tail(used: usize) -> String {
    "─".repeat(rule_width().saturating_sub(used))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        let mut buffer = CodeBuffer::new();
        let out = buffer.append("hello world\nsecond line");
        assert!(out.contains("hello world\n"));
        // incomplete line flows through without waiting for the newline
        assert!(out.contains("second line"));
        assert!(buffer.flush().is_empty());
    }

    #[test]
    fn fence_is_framed_and_highlighted() {
        let mut buffer = CodeBuffer::new();
        let mut out = buffer.append("```rust\nfn main() {}\n```\nafter");
        out.push_str(&buffer.flush());
        assert!(out.contains("rust"));
        assert!(out.contains("fn main"));
        assert!(out.contains("┌─["));
        assert!(out.contains("└"));
        assert!(out.contains("after"));
    }

    #[test]
    fn unterminated_fence_is_closed_on_flush() {
        let mut buffer = CodeBuffer::new();
        buffer.append("```\nlet x = 1;\n");
        let out = buffer.flush();
        assert!(out.contains("└"));
    }

    #[test]
    fn partial_backticks_are_held_until_decidable() {
        let mut buffer = CodeBuffer::new();
        let first = buffer.append("``");
        assert!(first.is_empty());
        let rest = buffer.append("`python\nprint(1)\n```\n");
        assert!(rest.contains("python"));
    }
}
