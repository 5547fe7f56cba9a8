//! PNG charts for the annotation dataset.
//!
//! Every chart is drawn independently from the read-only summary; one chart
//! failing to render is logged and does not stop the others.

pub mod draw;

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::analysis::counts::Count;
use crate::analysis::summary::DatasetSummary;
use crate::record::AnnotationRecord;
use draw::{
    GOLD, LIGHT_BLUE, LIGHT_CORAL, LIGHT_GREEN, MapPoint, PURPLE, SKY_BLUE, bar_chart, daily_line,
    heatmap, histogram, histogram_bins, pie_chart, scatter_map, stacked_keep_skip,
};

/// File stems of every chart, in render order.
pub const CHART_NAMES: [&str; 14] = [
    "annotations_per_annotator",
    "annotations_per_country",
    "top_20_cities",
    "keep_vs_skip_distribution",
    "emotion_distribution",
    "type_distribution",
    "msa_dialect_distribution",
    "confidence_distribution",
    "duration_distribution",
    "geographic_distribution",
    "emotion_type_crosstab",
    "annotator_agreement",
    "daily_activity",
    "keep_skip_by_country",
];

const TOP_CITIES: usize = 20;
const DURATION_BINS: usize = 30;

#[derive(Debug, Default, Serialize)]
pub struct ChartReport {
    pub rendered: Vec<PathBuf>,
    /// Chart name and the rendering error.
    pub failed: Vec<(String, String)>,
}

/// Kept rows that carry real coordinates. Sentinel rows are left out so they
/// do not pile up at (0, 0).
pub fn kept_map_points(records: &[AnnotationRecord]) -> Vec<MapPoint> {
    records
        .iter()
        .filter(|r| r.is_keep() && !r.has_sentinel_coordinates())
        .map(|r| MapPoint {
            country: r.country.clone(),
            latitude: r.latitude,
            longitude: r.longitude,
        })
        .collect()
}

/// Renders all charts into `dir`, creating it if needed.
///
/// # Errors
///
/// Fails only when the directory cannot be created; individual chart
/// failures are collected in the returned [`ChartReport`].
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn render_all(
    summary: &DatasetSummary,
    records: &[AnnotationRecord],
    dir: &Path,
) -> Result<ChartReport> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut report = ChartReport::default();
    for name in CHART_NAMES {
        let path = dir.join(format!("{name}.png"));
        info!(chart = name, "Rendering chart");
        match render_one(name, &path, summary, records) {
            Ok(()) => report.rendered.push(path),
            Err(e) => {
                error!(chart = name, error = format!("{e:#}"), "Chart failed to render");
                report.failed.push((name.to_string(), format!("{e:#}")));
            }
        }
    }

    info!(
        rendered = report.rendered.len(),
        failed = report.failed.len(),
        "All visualizations generated"
    );
    Ok(report)
}

fn render_one(
    name: &str,
    path: &Path,
    summary: &DatasetSummary,
    records: &[AnnotationRecord],
) -> Result<()> {
    match name {
        "annotations_per_annotator" => bar_chart(
            path,
            (1200, 600),
            "Annotations per Annotator",
            "Annotator",
            &summary.per_annotator,
            SKY_BLUE,
            true,
        ),
        "annotations_per_country" => bar_chart(
            path,
            (1400, 800),
            "Annotations per Country",
            "Country",
            &summary.per_country,
            LIGHT_CORAL,
            true,
        ),
        "top_20_cities" => bar_chart(
            path,
            (1600, 1000),
            "Top 20 Cities by Number of Annotations",
            "City",
            &summary.per_city[..summary.per_city.len().min(TOP_CITIES)],
            LIGHT_GREEN,
            true,
        ),
        "keep_vs_skip_distribution" => pie_chart(
            path,
            "Keep vs Skip Distribution",
            &summary.keep_or_skip,
            &[LIGHT_GREEN, LIGHT_CORAL],
        ),
        "emotion_distribution" => bar_chart(
            path,
            (1200, 800),
            "Emotion Distribution",
            "Emotion",
            &summary.emotions,
            GOLD,
            true,
        ),
        "type_distribution" => bar_chart(
            path,
            (1200, 800),
            "Audio Type Distribution",
            "Type",
            &summary.types,
            LIGHT_BLUE,
            true,
        ),
        "msa_dialect_distribution" => pie_chart(
            path,
            "MSA/Dialect Distribution",
            &summary.msa_or_dialect,
            &[LIGHT_CORAL, LIGHT_BLUE, LIGHT_GREEN, GOLD],
        ),
        "confidence_distribution" => pie_chart(
            path,
            "Confidence Level Distribution",
            &summary.confidence,
            &[LIGHT_GREEN, GOLD, LIGHT_CORAL],
        ),
        "duration_distribution" => histogram(
            path,
            "Distribution of Audio Duration",
            "Duration (seconds)",
            &histogram_bins(&summary.durations, DURATION_BINS),
        ),
        "geographic_distribution" => scatter_map(
            path,
            "Geographic Distribution of Kept Recordings",
            &kept_map_points(records),
        ),
        "emotion_type_crosstab" => heatmap(
            path,
            "Emotion vs Type Cross-tabulation",
            &summary.emotion_by_type,
        ),
        "annotator_agreement" => bar_chart(
            path,
            (1000, 600),
            "Distribution of Number of Annotators per File",
            "Number of Annotators",
            &agreement_bars(summary),
            PURPLE,
            false,
        ),
        "daily_activity" => daily_line(
            path,
            "Daily Annotation Activity",
            &summary.daily_activity.per_day,
        ),
        "keep_skip_by_country" => stacked_keep_skip(
            path,
            "Keep vs Skip by Country",
            &summary.keep_skip_by_country,
        ),
        other => anyhow::bail!("unknown chart {other}"),
    }
}

fn agreement_bars(summary: &DatasetSummary) -> Vec<Count> {
    summary
        .agreement
        .distribution
        .iter()
        .map(|(annotators, files)| Count {
            label: annotators.to_string(),
            count: *files,
        })
        .collect()
}
