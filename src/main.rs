//! CLI entry point for the radio annotation analysis.
//!
//! With no arguments, merges every CSV in `../radio2`, geocodes the rows,
//! and writes the combined CSVs, charts and Markdown report to the current
//! directory.

use anyhow::Result;
use clap::Parser;
use radio_annotations::pipeline::{PipelineConfig, PipelineOutcome, run};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "radio_annotations")]
#[command(about = "Combine and analyze radio recording annotation CSVs", long_about = None)]
struct Cli {
    /// Directory containing the annotation CSV files
    #[arg(short, long, env = "RADIO_INPUT_DIR", default_value = "../radio2")]
    input_dir: PathBuf,

    /// Directory to write the CSVs and report to
    #[arg(short, long, env = "RADIO_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Directory for chart images, relative to the output directory
    #[arg(short, long, env = "RADIO_FIGURES_DIR", default_value = "figures")]
    figures_dir: PathBuf,

    /// Skip rendering the chart images
    #[arg(long, env = "RADIO_NO_CHARTS", default_value_t = false)]
    no_charts: bool,
}

impl Cli {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input_dir: self.input_dir,
            output_dir: self.output_dir,
            figures_dir: self.figures_dir,
            render_charts: !self.no_charts,
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stdout progress + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/radio_annotations.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("radio_annotations.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stdout)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(json_layer)
        .init();

    let config = Cli::parse().into_config();
    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        "Starting comprehensive dataset analysis"
    );

    match run(&config)? {
        PipelineOutcome::NoInputFiles => {
            warn!("Failed to combine annotations: no input files");
        }
        PipelineOutcome::NoReadableFiles { files_found } => {
            warn!(files_found, "Failed to combine annotations: no readable files");
        }
        PipelineOutcome::Completed(summary) => {
            let (charts_rendered, charts_failed) = summary
                .charts
                .as_ref()
                .map(|c| (c.rendered.len(), c.failed.len()))
                .unwrap_or_default();
            info!(
                files_loaded = summary.files_loaded,
                files_found = summary.files_found,
                rows = summary.rows_after_dedup,
                duplicates_removed = summary.rows_before_dedup - summary.rows_after_dedup,
                keep_rows = summary.keep_rows,
                missing_coordinates = summary.geocoding.missing,
                charts_rendered,
                charts_failed,
                "Analysis complete"
            );
            info!(
                combined = %config.combined_path().display(),
                keep = %config.keep_path().display(),
                figures = %config.figures_path().display(),
                report = %config.report_path().display(),
                "Outputs written"
            );
        }
    }

    Ok(())
}
