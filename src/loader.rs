//! Discovery and parsing of annotation CSV files.

use anyhow::{Context, Result, bail};
use glob::glob;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::record::{AnnotationRecord, is_known_column};

/// Records read from a single input file.
#[derive(Debug)]
pub struct Frame {
    pub source: PathBuf,
    /// Headers without a typed field, in file order.
    pub extra_columns: Vec<String>,
    pub records: Vec<AnnotationRecord>,
}

/// Lists every `*.csv` file directly inside `dir`, in lexicographic order.
///
/// A missing directory yields an empty list rather than an error.
pub fn discover_annotation_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("*.csv");
    let pattern_str = pattern.to_string_lossy();
    info!(pattern = %pattern_str, "Searching for annotation files");

    let mut paths: Vec<PathBuf> = glob(&pattern_str)
        .with_context(|| format!("invalid glob pattern {pattern_str}"))?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        warn!(pattern = %pattern_str, "No CSV files found");
    } else {
        info!(count = paths.len(), "Found annotation files");
        for path in &paths {
            info!(file = %display_name(path), "Annotation file");
        }
    }

    Ok(paths)
}

/// Reads one annotation file.
///
/// # Errors
///
/// Fails if the file cannot be opened, has no header row, or contains a row
/// that does not parse. A single bad row rejects the whole file.
pub fn load_annotation_file(path: &Path) -> Result<Frame> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr.headers().context("reading header row")?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        bail!("no columns to parse from file");
    }

    let extra: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.is_empty() && !is_known_column(h))
        .collect();

    let mut records = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        // +2: one for the header line, one for 1-based numbering
        let row = result.with_context(|| format!("row {}", i + 2))?;
        let mut record: AnnotationRecord = row
            .deserialize(Some(&headers))
            .with_context(|| format!("row {}", i + 2))?;
        record.extra = extra
            .iter()
            .map(|&(col, name)| (name.to_string(), row.get(col).unwrap_or_default().to_string()))
            .collect();
        records.push(record);
    }

    Ok(Frame {
        source: path.to_path_buf(),
        extra_columns: extra.iter().map(|&(_, name)| name.to_string()).collect(),
        records,
    })
}

/// Loads every path, logging and skipping files that fail to parse.
pub fn load_frames(paths: &[PathBuf]) -> Vec<Frame> {
    let mut frames = Vec::with_capacity(paths.len());

    for path in paths {
        match load_annotation_file(path) {
            Ok(frame) => {
                info!(
                    file = %display_name(path),
                    rows = frame.records.len(),
                    "Loaded annotation file"
                );
                frames.push(frame);
            }
            Err(e) => {
                error!(path = %path.display(), error = format!("{e:#}"), "Error reading annotation file");
            }
        }
    }

    frames
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
