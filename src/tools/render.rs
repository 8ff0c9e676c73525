//! Text helpers shared by the tool handlers.

use chrono::DateTime;
use serde_json::Value as JsonValue;

/// Search snippets are capped at this many characters.
pub const SNIPPET_CHARS: usize = 200;

/// Lowercase ASCII slug: runs of anything but `[a-z0-9]` become one `-`,
/// with no leading or trailing `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars().map(|c| c.to_ascii_lowercase()) {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }
    slug
}

/// Cut `text` to `max` characters, appending `...` when anything was cut.
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_owned(),
    }
}

/// First string-ish value among `keys`; numbers are rendered too so numeric
/// ids still show up.
pub fn field(item: &JsonValue, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match item.get(*k) {
        Some(JsonValue::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub fn id_of(item: &JsonValue) -> Option<String> {
    field(item, &["id", "_id", "uuid"])
}

pub fn title_of(item: &JsonValue) -> String {
    field(item, &["title", "name"]).unwrap_or_else(|| "Untitled".to_owned())
}

/// Items from a bare array payload, or from the array under `key`.
pub fn items(payload: &JsonValue, key: &str) -> Vec<JsonValue> {
    match payload {
        JsonValue::Array(list) => list.clone(),
        JsonValue::Object(obj) => obj
            .get(key)
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

pub fn approval_icon(status: &str) -> &'static str {
    match status {
        "pending" => "⏳",
        "approved" => "✅",
        "rejected" => "❌",
        _ => "❔",
    }
}

pub fn priority_icon(priority: &str) -> &'static str {
    match priority {
        "critical" => "🔴",
        "high" => "🟠",
        "medium" => "🟡",
        "low" => "🟢",
        _ => "⚪",
    }
}

/// RFC 3339 timestamps as `YYYY-MM-DD HH:MM UTC`; anything else verbatim.
pub fn timestamp(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.naive_utc().format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|_| raw.to_owned())
}
