// ScanTrail - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use serde::{Serialize, Serializer};

// =============================================================================
// Decoded event (output of the line decoder)
// =============================================================================

/// One structurally valid scanner log line.
///
/// Produced by `parser::decode_line` and consumed immediately by the
/// reconstructor; never stored beyond a single fold step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Leading numeric timestamp (milliseconds in scanner exports, but the
    /// unit is not interpreted).
    pub timestamp: u64,

    /// Raw status token, trimmed.
    pub status: String,

    /// Status family the token belongs to.
    pub kind: StatusKind,

    /// Correlation id from the first `attempt=<int>` marker in the payload.
    pub attempt_id: Option<u64>,

    /// Free-text tail after the playlist field, trimmed.
    pub payload: String,
}

// =============================================================================
// Status kinds
// =============================================================================

/// Closed set of status tokens the reconstructor reacts to.
///
/// Anything not listed maps to `Other`: it is still recorded in an attempt's
/// history but triggers no state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Start,
    Finish,
    Ok,
    StepOk,
    Error,
    Fatal,
    StepError,
    ProviderError,
    ProviderTimeout,
    FailFast,
    Timeout,
    Other,
}

impl StatusKind {
    /// Map a raw status token to its kind. Matching is exact and case-sensitive.
    pub fn from_token(token: &str) -> Self {
        match token {
            "scanner_start" => Self::Start,
            "scanner_finish" => Self::Finish,
            "scanner_ok" => Self::Ok,
            "scanner_step_ok" => Self::StepOk,
            "scanner_error" => Self::Error,
            "scanner_fatal" => Self::Fatal,
            "scanner_step_error" => Self::StepError,
            "scanner_provider_error" => Self::ProviderError,
            "scanner_provider_timeout" => Self::ProviderTimeout,
            "scanner_fail_fast" => Self::FailFast,
            "scanner_timeout" => Self::Timeout,
            _ => Self::Other,
        }
    }

    /// Statuses whose payload may carry a result count.
    pub fn is_success_like(self) -> bool {
        matches!(self, Self::Ok | Self::Finish | Self::StepOk)
    }

    /// Statuses whose payload is recorded as an attempt error.
    pub fn is_error_like(self) -> bool {
        matches!(
            self,
            Self::Error
                | Self::Fatal
                | Self::StepError
                | Self::ProviderError
                | Self::ProviderTimeout
                | Self::FailFast
                | Self::Timeout
        )
    }
}

// =============================================================================
// Live attempt state
// =============================================================================

/// Mutable state of one open attempt, owned by the reconstructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptState {
    pub attempt_id: u64,
    pub started_at: u64,
    pub query: String,
    pub provider: String,
    pub mode: String,
    pub preset: String,

    /// Running maximum of result counts seen on success-like events.
    pub found: u64,

    /// Payloads of error-like events, in arrival order.
    pub errors: Vec<String>,

    /// Every status token seen for this attempt, in arrival order.
    pub statuses: Vec<String>,

    /// Every payload seen for this attempt, parallel to `statuses`.
    pub raw_messages: Vec<String>,
}

// =============================================================================
// Outcome label
// =============================================================================

/// Three-way outcome of a closed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Success,
    Empty,
    Failed,
}

impl Label {
    /// Positive results win over errors; errors win over an empty outcome.
    pub fn from_outcome(found: u64, has_errors: bool) -> Self {
        if found > 0 {
            Self::Success
        } else if has_errors {
            Self::Failed
        } else {
            Self::Empty
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Error category
// =============================================================================

/// Coarse failure category assigned by `classify::classify_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Dns,
    Timeout,
    RateLimit,
    HttpForbidden,
    HttpUnauthorized,
    TlsSsl,
    NetworkIo,
    Other,
}

impl ErrorCategory {
    /// Tag written to the export and the report.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dns => "dns",
            Self::Timeout => "timeout",
            Self::RateLimit => "rate_limit",
            Self::HttpForbidden => "http_forbidden",
            Self::HttpUnauthorized => "http_unauthorized",
            Self::TlsSsl => "tls_ssl",
            Self::NetworkIo => "network_io",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Attempt record (unit of export)
// =============================================================================

/// A closed attempt, ready for export and aggregation.
///
/// Field order is the JSONL key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttemptRecord {
    #[serde(rename = "attempt")]
    pub attempt_id: u64,
    pub started_at: u64,
    pub finished_at: u64,
    pub query: String,
    pub provider: String,
    pub mode: String,
    pub preset: String,
    pub found: u64,
    pub label: Label,

    /// Category of the last recorded error; `None` is exported as `""`.
    #[serde(serialize_with = "serialize_error_type")]
    pub error_type: Option<ErrorCategory>,

    /// Last recorded error, truncated. Empty when no error was recorded.
    pub error: String,

    pub statuses: Vec<String>,
}

impl AttemptRecord {
    /// Export tag of `error_type` (`""` when absent).
    pub fn error_type_str(&self) -> &'static str {
        self.error_type.map(|c| c.as_str()).unwrap_or("")
    }
}

fn serialize_error_type<S: Serializer>(
    value: &Option<ErrorCategory>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.map(|c| c.as_str()).unwrap_or(""))
}
