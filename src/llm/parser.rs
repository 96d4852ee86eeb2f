//! Response parsing for LLM outputs.
//!
//! Turns raw translator output into a statement the store can execute by
//! stripping markdown code fences and their language tags.

use regex::Regex;
use std::sync::OnceLock;

/// Leading keywords of SQLite statements. A word in this list right after
/// an opening fence is the statement itself, not a language tag.
const STATEMENT_KEYWORDS: &[&str] = &[
    "alter", "analyze", "attach", "begin", "commit", "create", "delete", "detach", "drop",
    "end", "explain", "insert", "pragma", "reindex", "release", "replace", "rollback",
    "savepoint", "select", "update", "vacuum", "values", "with",
];

/// Matches a fenced block: an opening fence, the body, and the closing fence.
fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)```(.*?)```").expect("fence pattern is a valid regex"))
}

/// Strips a code-fence wrapper from a generated statement and trims it.
///
/// Handles:
/// - ```` ```sql ... ``` ```` (language tag on the opening fence line,
///   followed by a newline or by spaces)
/// - ```` ``` ... ``` ```` (no language tag)
/// - plain text with no fence, which is only trimmed
///
/// When the model surrounds a fenced block with prose, the first block wins.
/// The result is not validated as SQL.
pub fn sanitize_statement(raw: &str) -> String {
    let trimmed = raw.trim();

    match fence_pattern().captures(trimmed) {
        Some(captures) => captures
            .get(1)
            .map(|body| strip_language_tag(body.as_str()).trim().to_string())
            .unwrap_or_default(),
        None => strip_dangling_fence(trimmed).to_string(),
    }
}

/// Removes an opening fence whose closing fence never arrived.
fn strip_dangling_fence(text: &str) -> &str {
    match text.strip_prefix("```") {
        Some(rest) => strip_language_tag(rest).trim(),
        None => text,
    }
}

/// Drops a language tag from the start of a fence body.
///
/// The tag must sit on the fence line, start with a letter, be followed by
/// whitespace and not be a statement keyword.
fn strip_language_tag(body: &str) -> &str {
    let rest = body.trim_start_matches([' ', '\t']);
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
        .unwrap_or(rest.len());
    let (tag, after) = rest.split_at(tag_len);

    let is_tag = tag.starts_with(|c: char| c.is_ascii_alphabetic())
        && after.starts_with([' ', '\t', '\r', '\n'])
        && !STATEMENT_KEYWORDS.contains(&tag.to_ascii_lowercase().as_str());

    if is_tag {
        after
    } else {
        body
    }
}
