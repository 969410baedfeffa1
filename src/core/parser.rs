// ScanTrail - core/parser.rs
//
// Line decoder for exported scanner logs.
// Core layer: pure functions over &str, never touches the filesystem.
//
// Line shape:
//   <timestamp> | <status> | playlist=<id-or--> | <message>
//
// Lines that do not fit the shape are dropped without error. Payload fields
// are recovered by independent extractors, each optional.

use crate::core::model::{DecodedEvent, StatusKind};
use regex::Regex;
use std::sync::OnceLock;

/// Compile one of the decoder's static patterns.
///
/// Patterns are literals exercised by the unit tests below, so a mistake
/// shows up as a failing test rather than a runtime panic.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("parser: invalid built-in regex")
}

fn line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(
            r"^\s*(?P<ts>[0-9]+)\s*\|\s*(?P<status>[a-zA-Z0-9_]+)\s*\|\s*playlist=(?P<playlist>[^|]*)\|\s*(?P<msg>.*)$",
        )
    })
}

fn attempt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"attempt=([0-9]+)"))
}

fn query_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"query=([^,|]+)"))
}

fn provider_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"provider=([A-Z_]+)"))
}

fn mode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"mode=([A-Z_]+)"))
}

fn preset_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"preset=([a-zA-Z0-9_-]+)"))
}

fn found_re() -> &'static Regex {
    // The scanner logs counts either as `results=N` or in its Russian UI
    // string "Найдено N" ("found N").
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?:results=|Найдено\s+)([0-9]+)"))
}

// =============================================================================
// Line decoding
// =============================================================================

/// Decode one raw log line.
///
/// Returns `None` for any line that does not match the four-field shape,
/// including lines whose timestamp overflows `u64`.
pub fn decode_line(line: &str) -> Option<DecodedEvent> {
    let caps = line_re().captures(line)?;

    let timestamp = match caps["ts"].parse::<u64>() {
        Ok(ts) => ts,
        Err(_) => {
            tracing::trace!(line, "Timestamp out of range; line dropped");
            return None;
        }
    };

    let status = caps["status"].trim().to_string();
    let kind = StatusKind::from_token(&status);
    let payload = caps["msg"].trim().to_string();
    let attempt_id = extract_attempt_id(&payload);

    Some(DecodedEvent {
        timestamp,
        status,
        kind,
        attempt_id,
        payload,
    })
}

// =============================================================================
// Payload extractors
// =============================================================================

/// First capture group of `re` in `text`, whitespace-trimmed.
fn extract_first(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Attempt id from the first `attempt=<int>` marker.
pub fn extract_attempt_id(payload: &str) -> Option<u64> {
    attempt_re()
        .captures(payload)
        .and_then(|caps| caps[1].parse().ok())
}

/// Normalised query text from the first `query=` marker.
pub fn extract_query(payload: &str) -> Option<String> {
    extract_first(query_re(), payload).map(|raw| normalize_query(&raw))
}

/// Provider token (uppercase letters and underscores).
pub fn extract_provider(payload: &str) -> Option<String> {
    extract_first(provider_re(), payload)
}

/// Mode token (uppercase letters and underscores).
pub fn extract_mode(payload: &str) -> Option<String> {
    extract_first(mode_re(), payload)
}

/// Preset token (alphanumerics, underscores, hyphens).
pub fn extract_preset(payload: &str) -> Option<String> {
    extract_first(preset_re(), payload)
}

/// Result count from `results=N` or `Найдено N`, whichever comes first.
///
/// Absent or unparsable counts read as zero.
pub fn extract_found_count(payload: &str) -> u64 {
    found_re()
        .captures(payload)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Collapse internal whitespace runs to one space and strip surrounding
/// spaces, commas, periods and semicolons.
pub fn normalize_query(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| matches!(c, ' ' | ',' | '.' | ';'))
        .to_string()
}
