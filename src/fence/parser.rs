//! Line-based fence scanner.

use super::Block;
use regex::Regex;
use std::sync::LazyLock;

/// Opening fence: up to three spaces/tabs of indent, 3+ backticks or 3+ tildes, an optional
/// language tag and trailing blanks. Applied to a single line without its `\n`.
static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t]{0,3}(`{3,}|~{3,})([A-Za-z0-9_+\-]*)[ \t]*\r?$").unwrap());

const BACKTICK_CLOSER: &str = "```";
const TILDE_CLOSER: &str = "~~~";

/// A line of the document with its byte offsets.
#[derive(Debug, Clone, Copy)]
struct Line {
    /// Offset of the first byte of the line
    start: usize,
    /// Offset just before the `\n` (or end of text)
    content_end: usize,
    /// Offset of the next line (past the `\n`), or end of text
    next: usize,
}

impl Line {
    fn content<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.content_end]
    }
}

fn split_lines(text: &str) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut pos = 0;
    for raw in text.split_inclusive('\n') {
        let next = pos + raw.len();
        let content_end = if raw.ends_with('\n') { next - 1 } else { next };
        lines.push(Line {
            start: pos,
            content_end,
            next,
        });
        pos = next;
    }
    lines
}

fn closer_for(fence_char: char) -> &'static str {
    if fence_char == '~' { TILDE_CLOSER } else { BACKTICK_CLOSER }
}

/// Index (into `lines`) of the first closing fence at or after `from`.
fn find_closing_fence(text: &str, lines: &[Line], from: usize, fence_char: char) -> Option<usize> {
    let closer = closer_for(fence_char);
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, line)| line.content(text).trim() == closer)
        .map(|(idx, _)| idx)
}

/// Body text as handed to a backend: one trailing newline dropped, CRLF folded to LF.
fn body_text(raw: &str) -> String {
    let trimmed = raw
        .strip_suffix("\r\n")
        .or_else(|| raw.strip_suffix('\n'))
        .unwrap_or(raw);
    if trimmed.contains("\r\n") {
        trimmed.replace("\r\n", "\n")
    } else {
        trimmed.to_string()
    }
}

/// Parse every terminated fenced block in `text`, in document order.
///
/// Never fails: lines that look like an opening fence but are never closed are skipped, and the
/// scan resumes on the line that follows them.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let lines = split_lines(text);
    let mut blocks = Vec::new();
    // Once a fence family has no closer after some line, it has none after any later line either.
    let mut unclosed_backtick = false;
    let mut unclosed_tilde = false;

    let mut idx = 0;
    while idx < lines.len() {
        let line = lines[idx];
        let Some(caps) = OPENING_FENCE.captures(line.content(text)) else {
            idx += 1;
            continue;
        };

        let marker = caps.get(1).map_or("", |m| m.as_str());
        let fence_char = if marker.starts_with('~') { '~' } else { '`' };
        let already_unclosed = if fence_char == '~' {
            unclosed_tilde
        } else {
            unclosed_backtick
        };

        let closing = if already_unclosed {
            None
        } else {
            find_closing_fence(text, &lines, idx + 1, fence_char)
        };

        let Some(close_idx) = closing else {
            log::debug!("Skipping unterminated {fence_char} fence at byte {}", line.start);
            if fence_char == '~' {
                unclosed_tilde = true;
            } else {
                unclosed_backtick = true;
            }
            idx += 1;
            continue;
        };

        let close = lines[close_idx];
        let code_start = line.next;
        let code_end = close.start;
        blocks.push(Block {
            language: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            code: body_text(&text[code_start..code_end]),
            start: line.start,
            end: close.next,
            code_start,
            code_end,
            fence_char,
            fence_length: marker.len(),
        });
        idx = close_idx + 1;
    }

    log::debug!("Parsed {} fenced block(s)", blocks.len());
    blocks
}
