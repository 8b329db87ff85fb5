use crate::config::FREE_TEXT_MAX_CHARS;
use once_cell::sync::Lazy;
use regex::Regex;

// Compiled regexes for cleaning model output and user notes
static JSON_FENCE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json|JSON)?\s*\n?(.*?)\n?\s*```\s*$").unwrap());
static WHITESPACE_RUN_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````) that
/// models like to wrap JSON answers in. Text without a fence is returned
/// trimmed.
pub fn strip_json_fence(text: &str) -> &str {
    match JSON_FENCE_REGEX.captures(text) {
        Some(captures) => captures.get(1).map_or("", |m| m.as_str()).trim(),
        None => text.trim(),
    }
}

/// Collapse whitespace runs and cap the length of free-text notes before
/// they are spliced into a prompt.
pub fn tidy_free_text(input: &str) -> String {
    let collapsed = WHITESPACE_RUN_REGEX.replace_all(input.trim(), " ");
    collapsed.chars().take(FREE_TEXT_MAX_CHARS).collect()
}
