// ScanTrail - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ScanTrail";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ScanTrail";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Scanner log vocabulary
// =============================================================================

/// Provider recorded when the start event does not name one.
pub const DEFAULT_PROVIDER: &str = "ALL";

/// Mode recorded when the start event does not name one.
pub const DEFAULT_MODE: &str = "AUTO";

/// Preset recorded when the start event does not name one.
pub const DEFAULT_PRESET: &str = "-";

// =============================================================================
// Export limits
// =============================================================================

/// Maximum number of characters of the last error kept on an exported record.
pub const DEFAULT_MAX_ERROR_CHARS: usize = 1_000;

/// Smallest accepted `[export] max_error_chars`.
pub const MIN_MAX_ERROR_CHARS: usize = 1;

/// Largest accepted `[export] max_error_chars`.
pub const ABSOLUTE_MAX_ERROR_CHARS: usize = 100_000;

// =============================================================================
// Report limits
// =============================================================================

/// Number of rows in the "top successful queries" section.
pub const DEFAULT_TOP_QUERIES: usize = 10;

/// Number of rows in the "frequent error causes" section.
pub const DEFAULT_TOP_ERROR_TYPES: usize = 10;

/// Smallest accepted value for a "top N" report section.
pub const MIN_TOP_ROWS: usize = 1;

/// Largest accepted value for a "top N" report section.
pub const MAX_TOP_ROWS: usize = 1_000;

// =============================================================================
// Paths
// =============================================================================

/// Default JSON-lines export path (relative to the working directory).
pub const DEFAULT_OUT_JSONL: &str = "tools/ai/training_dataset.jsonl";

/// Default Markdown report path (relative to the working directory).
pub const DEFAULT_OUT_SUMMARY: &str = "tools/ai/training_summary.md";

/// Configuration file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Logging
// =============================================================================

/// Default log level when neither RUST_LOG, --debug, nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted in `[logging] level`.
pub const VALID_LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
