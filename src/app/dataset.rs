// ScanTrail - app/dataset.rs
//
// Run orchestration: read the log, fold it into attempt records, and write
// the JSONL dataset and Markdown summary.
//
// The whole log is read into memory first and processed in a single
// synchronous pass. `build_dataset` is the pure part; `run` adds the
// filesystem boundary around it.

use crate::core::export;
use crate::core::model::AttemptRecord;
use crate::core::reconstruct::{self, ReconstructStats};
use crate::core::report;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::Result;
use std::path::PathBuf;
use std::time::Instant;

/// In-memory artifacts of one pass.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Closed attempts in closing order, one JSONL line each.
    pub records: Vec<AttemptRecord>,
    /// Markdown summary text.
    pub report: String,
    pub stats: ReconstructStats,
}

/// Input and output locations for a run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: PathBuf,
    pub out_jsonl: PathBuf,
    pub out_summary: PathBuf,
}

/// Fold raw lines into records and render the summary.
pub fn build_dataset<I, S>(lines: I, config: &AppConfig) -> Dataset
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let output = reconstruct::reconstruct_lines(lines, &config.reconstruct);
    let report = report::build_summary(&output.records, &config.report);
    Dataset {
        records: output.records,
        report,
        stats: output.stats,
    }
}

/// Execute a full run: read the input, build the dataset, write both outputs.
///
/// A missing input is the only fatal data condition; everything inside the
/// log degrades to "ignore or default".
pub fn run(paths: &RunPaths, config: &AppConfig) -> Result<Dataset> {
    let started = Instant::now();
    tracing::info!(input = %paths.input.display(), "Reading scanner log");

    let lines = fs::read_log_lines(&paths.input)?;
    tracing::debug!(lines = lines.len(), "Scanner log loaded");

    let dataset = build_dataset(&lines, config);

    let mut writer = fs::create_output_file(&paths.out_jsonl)?;
    export::export_jsonl(&dataset.records, &mut writer, &paths.out_jsonl)?;

    fs::write_text(&paths.out_summary, &dataset.report)?;

    tracing::info!(
        attempts = dataset.records.len(),
        discarded = dataset.stats.attempts_discarded,
        dropped_lines = dataset.stats.lines_dropped,
        jsonl = %paths.out_jsonl.display(),
        summary = %paths.out_summary.display(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Dataset written"
    );

    Ok(dataset)
}
