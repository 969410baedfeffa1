// ScanTrail - core/classify.rs
//
// Failure categorisation by case-insensitive substring markers.
// Core layer: pure logic, no I/O.

use crate::core::model::ErrorCategory;

/// Ordered (markers, category) rules. The first rule with any marker present
/// in the lowercased message wins, so more specific network signatures must
/// stay ahead of generic ones: a DNS failure text usually also contains
/// "timeout" or "rate" somewhere in its stack trace.
const RULES: &[(&[&str], ErrorCategory)] = &[
    (
        &["unknownhostexception", "unable to resolve host"],
        ErrorCategory::Dns,
    ),
    (&["timeout", "timed out"], ErrorCategory::Timeout),
    (&["http 429", "rate"], ErrorCategory::RateLimit),
    (&["http 403"], ErrorCategory::HttpForbidden),
    (&["http 401"], ErrorCategory::HttpUnauthorized),
    (&["ssl"], ErrorCategory::TlsSsl),
    (&["network io"], ErrorCategory::NetworkIo),
];

/// Assign a category to an error message.
///
/// Returns `ErrorCategory::Other` when no marker matches.
pub fn classify_error(message: &str) -> ErrorCategory {
    let lowered = message.to_lowercase();
    RULES
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| lowered.contains(m)))
        .map(|(_, category)| *category)
        .unwrap_or(ErrorCategory::Other)
}
