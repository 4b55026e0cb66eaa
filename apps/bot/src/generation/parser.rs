//! Marker-based parsing of generated replies.
//!
//! The model is instructed to answer in a fixed two-marker format
//! (`НАЗВАНИЕ: ...` on one line, `ТЕКСТ ОТКЛИКА:` followed by the
//! body). Output that misses either marker is delivered to the user
//! verbatim instead of failing.

use std::sync::LazyLock;

use regex::Regex;

/// Chat transports cap outgoing messages around 4096 characters;
/// anything longer is cut before parsing.
pub const MAX_REPLY_CHARS: usize = 4000;
const TRUNCATION_NOTICE: &str = "\n\n(ответ укорочен)";

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)НАЗВАНИЕ:\s*(.+?)(?:\n|$)").expect("valid title regex"));
static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)ТЕКСТ ОТКЛИКА:\s*(.+)").expect("valid body regex"));

/// Result of parsing raw generation output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReply {
    /// Both markers found; title and body extracted and trimmed.
    Structured { title: String, body: String },
    /// Either marker missing; the whole raw text is the payload and
    /// must be shown as-is.
    Raw(String),
}

/// Caps the raw reply at [`MAX_REPLY_CHARS`] characters, appending a
/// truncation notice when anything was cut.
pub fn truncate_reply(raw: String) -> String {
    if raw.chars().count() <= MAX_REPLY_CHARS {
        return raw;
    }
    let mut truncated: String = raw.chars().take(MAX_REPLY_CHARS).collect();
    truncated.push_str(TRUNCATION_NOTICE);
    truncated
}

/// Extracts title and body from the two-marker format, falling back to
/// the raw text when either marker is absent.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let title = TITLE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());
    let body = BODY_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    match (title, body) {
        (Some(title), Some(body)) => ParsedReply::Structured { title, body },
        _ => ParsedReply::Raw(raw.to_string()),
    }
}
