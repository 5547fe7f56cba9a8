//! End-to-end run: load, merge, geocode, write, chart, report.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::analysis::summary::DatasetSummary;
use crate::charts::{self, ChartReport};
use crate::geocode::{GeocodeSummary, Geocoder};
use crate::loader::{discover_annotation_files, load_frames};
use crate::merge::{concat_frames, dedup_last, extra_columns};
use crate::output::{print_json, write_combined, write_keep_only};
use crate::report::save_summary_report;

/// Where to read from and write to.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Relative paths are resolved against `output_dir`.
    pub figures_dir: PathBuf,
    pub combined_file: String,
    pub keep_file: String,
    pub report_file: String,
    pub render_charts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("../radio2"),
            output_dir: PathBuf::from("."),
            figures_dir: PathBuf::from("figures"),
            combined_file: "combined_annotations_final.csv".to_string(),
            keep_file: "filtered_keep_annotations.csv".to_string(),
            report_file: "summary_report.md".to_string(),
            render_charts: true,
        }
    }
}

impl PipelineConfig {
    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join(&self.combined_file)
    }

    pub fn keep_path(&self) -> PathBuf {
        self.output_dir.join(&self.keep_file)
    }

    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.report_file)
    }

    pub fn figures_path(&self) -> PathBuf {
        self.output_dir.join(&self.figures_dir)
    }
}

/// What a completed run produced.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_loaded: usize,
    pub rows_before_dedup: usize,
    pub rows_after_dedup: usize,
    pub keep_rows: usize,
    pub geocoding: GeocodeSummary,
    pub charts: Option<ChartReport>,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    /// No CSV files in the input directory; nothing was written.
    NoInputFiles,
    /// Files were found but none parsed; nothing was written.
    NoReadableFiles { files_found: usize },
    Completed(RunSummary),
}

/// Runs the whole pipeline, stamping the report with the local time.
pub fn run(config: &PipelineConfig) -> Result<PipelineOutcome> {
    run_at(config, Local::now().naive_local())
}

/// Runs the whole pipeline with an explicit report timestamp.
#[tracing::instrument(skip_all, fields(input_dir = %config.input_dir.display()))]
pub fn run_at(config: &PipelineConfig, generated_at: NaiveDateTime) -> Result<PipelineOutcome> {
    info!("Combining all annotation files");
    let paths = discover_annotation_files(&config.input_dir)?;
    if paths.is_empty() {
        warn!(dir = %config.input_dir.display(), "No CSV files found in input folder");
        return Ok(PipelineOutcome::NoInputFiles);
    }

    let frames = load_frames(&paths);
    if frames.is_empty() {
        warn!(files_found = paths.len(), "No valid CSV files could be read");
        return Ok(PipelineOutcome::NoReadableFiles {
            files_found: paths.len(),
        });
    }
    let files_loaded = frames.len();

    let extra_columns = extra_columns(&frames);
    let records = concat_frames(frames);
    let rows_before_dedup = records.len();
    info!(rows = rows_before_dedup, "Before removing duplicates");
    let mut records = dedup_last(records);
    info!(rows = records.len(), "After removing duplicates");

    info!("Adding coordinates");
    let geocoding = Geocoder::new().annotate(&mut records);

    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let rows_after_dedup = write_combined(&config.combined_path(), &extra_columns, &records)?;
    let keep_rows = write_keep_only(&config.keep_path(), &extra_columns, &records)?;

    info!("Generating comprehensive analysis");
    let summary = DatasetSummary::from_records(&records);
    print_json(&summary)?;

    let charts = if config.render_charts {
        Some(charts::render_all(&summary, &records, &config.figures_path())?)
    } else {
        info!("Chart rendering disabled");
        None
    };

    save_summary_report(&config.report_path(), &summary, &geocoding, generated_at)?;

    Ok(PipelineOutcome::Completed(RunSummary {
        files_found: paths.len(),
        files_loaded,
        rows_before_dedup,
        rows_after_dedup,
        keep_rows,
        geocoding,
        charts,
    }))
}
