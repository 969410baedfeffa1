// ScanTrail - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::reconstruct::ReconstructConfig;
use crate::core::report::ReportConfig;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ScanTrail configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/scantrail/ or %APPDATA%\ScanTrail\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[output]` section.
    pub output: OutputSection,
    /// `[export]` section.
    pub export: ExportSection,
    /// `[report]` section.
    pub report: ReportSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Default JSON-lines dataset path.
    pub jsonl: Option<String>,
    /// Default Markdown summary path.
    pub summary: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    /// Characters of the last error kept per record.
    pub max_error_chars: Option<usize>,
}

/// `[report]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ReportSection {
    /// Rows in the top successful queries section.
    pub top_queries: Option<usize>,
    /// Rows in the frequent error causes section.
    pub top_error_types: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Dataset path used when --out-jsonl is not given.
    pub out_jsonl: PathBuf,
    /// Summary path used when --out-summary is not given.
    pub out_summary: PathBuf,
    pub reconstruct: ReconstructConfig,
    pub report: ReportConfig,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            out_jsonl: PathBuf::from(constants::DEFAULT_OUT_JSONL),
            out_summary: PathBuf::from(constants::DEFAULT_OUT_SUMMARY),
            reconstruct: ReconstructConfig::default(),
            report: ReportConfig::default(),
            log_level: None,
        }
    }
}

/// Read and parse a config file. `Ok(None)` when the file does not exist.
pub fn read_raw_config(path: &Path) -> Result<Option<RawConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::TomlParse {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Validate one "top N" row limit.
fn validate_top_rows(
    key: &str,
    value: Option<usize>,
    default: usize,
    warnings: &mut Vec<String>,
) -> usize {
    match value {
        Some(rows) if (constants::MIN_TOP_ROWS..=constants::MAX_TOP_ROWS).contains(&rows) => rows,
        Some(rows) => {
            warnings.push(format!(
                "[report] {key} = {rows} is out of range ({}-{}). Using default ({default}).",
                constants::MIN_TOP_ROWS,
                constants::MAX_TOP_ROWS,
            ));
            default
        }
        None => default,
    }
}

/// Validate a parsed config against named constants.
pub fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();
    let mut config = AppConfig::default();

    // -- Output paths --
    if let Some(jsonl) = raw.output.jsonl.filter(|p| !p.trim().is_empty()) {
        config.out_jsonl = PathBuf::from(jsonl);
    }
    if let Some(summary) = raw.output.summary.filter(|p| !p.trim().is_empty()) {
        config.out_summary = PathBuf::from(summary);
    }

    // -- Export: max_error_chars --
    if let Some(chars) = raw.export.max_error_chars {
        if (constants::MIN_MAX_ERROR_CHARS..=constants::ABSOLUTE_MAX_ERROR_CHARS).contains(&chars)
        {
            config.reconstruct.max_error_chars = chars;
        } else {
            warnings.push(format!(
                "[export] max_error_chars = {chars} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MAX_ERROR_CHARS,
                constants::ABSOLUTE_MAX_ERROR_CHARS,
                constants::DEFAULT_MAX_ERROR_CHARS,
            ));
        }
    }

    // -- Report: row limits --
    config.report.top_queries = validate_top_rows(
        "top_queries",
        raw.report.top_queries,
        constants::DEFAULT_TOP_QUERIES,
        &mut warnings,
    );
    config.report.top_error_types = validate_top_rows(
        "top_error_types",
        raw.report.top_error_types,
        constants::DEFAULT_TOP_ERROR_TYPES,
        &mut warnings,
    );

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        if constants::VALID_LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}

/// Load and validate config.toml at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// A missing file yields defaults with no warnings; an unreadable or
/// unparseable file yields defaults plus a warning so the run still proceeds.
///
/// Called before logging is initialised (the config may set the level), so
/// warnings are returned rather than logged here.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    match read_raw_config(config_path) {
        Ok(Some(raw)) => validate(raw),
        Ok(None) => (AppConfig::default(), Vec::new()),
        Err(e) => (
            AppConfig::default(),
            vec![format!(
                "{e}. Using defaults. See config.example.toml for the expected format."
            )],
        ),
    }
}

/// Load and validate a config file the user named explicitly.
///
/// Unlike `load_config`, a missing, unreadable or unparseable file is an
/// error: the caller asked for this file, so defaults are never substituted.
/// Validation warnings are still returned as non-fatal.
pub fn load_explicit_config(config_path: &Path) -> Result<(AppConfig, Vec<String>), ConfigError> {
    match read_raw_config(config_path)? {
        Some(raw) => Ok(validate(raw)),
        None => Err(ConfigError::NotFound {
            path: config_path.to_path_buf(),
        }),
    }
}
