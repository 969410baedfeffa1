// ScanTrail - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Running the dataset build and reporting the result

use clap::Parser;
use scantrail::app::dataset::{self, RunPaths};
use scantrail::platform::config::{self, PlatformPaths};
use scantrail::util;
use scantrail::util::error::ScanTrailError;
use std::path::PathBuf;

/// ScanTrail - build a scanner query training dataset from exported logs.
///
/// Reconstructs scanner attempts from an exported log and writes a JSONL
/// dataset plus a Markdown summary.
#[derive(Parser, Debug)]
#[command(name = "scantrail", version, about)]
struct Cli {
    /// Path to the exported scanner log.
    #[arg(long = "input")]
    input: PathBuf,

    /// Output JSONL path [default: tools/ai/training_dataset.jsonl].
    #[arg(long = "out-jsonl")]
    out_jsonl: Option<PathBuf>,

    /// Output Markdown summary path [default: tools/ai/training_summary.md].
    #[arg(long = "out-summary")]
    out_summary: Option<PathBuf>,

    /// Config file (defaults to config.toml in the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Config comes first: it may set the log level. An explicit --config
    // must load; the platform default may be absent or broken.
    let (config_path, loaded) = match cli.config.clone() {
        Some(path) => {
            let loaded = config::load_explicit_config(&path);
            (path, loaded)
        }
        None => {
            let path = PlatformPaths::resolve().config_file();
            let loaded = Ok(config::load_config(&path));
            (path, loaded)
        }
    };
    let (app_config, config_warnings) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            util::logging::init(cli.debug, None);
            let e = ScanTrailError::from(e);
            tracing::error!(error = %e, "Config load failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "ScanTrail starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let paths = RunPaths {
        input: cli.input,
        out_jsonl: cli.out_jsonl.unwrap_or_else(|| app_config.out_jsonl.clone()),
        out_summary: cli
            .out_summary
            .unwrap_or_else(|| app_config.out_summary.clone()),
    };

    match dataset::run(&paths, &app_config) {
        Ok(result) => {
            println!("Done. Parsed attempts: {}", result.records.len());
            println!("JSONL: {}", paths.out_jsonl.display());
            println!("Summary: {}", paths.out_summary.display());
        }
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
