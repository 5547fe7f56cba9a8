//! Markdown summary report.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fmt::Write as _;
use std::path::Path;
use tracing::info;

use crate::analysis::counts::Count;
use crate::analysis::summary::DatasetSummary;
use crate::geocode::GeocodeSummary;

const TOP_N: usize = 10;

/// Formats an integer with thousands separators, e.g. `12,345`.
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn seconds(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2} seconds"))
}

fn top(counts: &[Count]) -> &[Count] {
    &counts[..counts.len().min(TOP_N)]
}

fn count_table(out: &mut String, header: &str, counts: &[Count]) {
    if counts.is_empty() {
        out.push_str("_No data._\n");
        return;
    }
    let _ = writeln!(out, "| {header} | Annotations |");
    out.push_str("|---|---:|\n");
    for c in counts {
        let _ = writeln!(out, "| {} | {} |", c.label.replace('|', "\\|"), thousands(c.count));
    }
}

/// Renders the report. `generated_at` is passed in so output is reproducible.
pub fn render(
    summary: &DatasetSummary,
    geocoding: &GeocodeSummary,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Radio Recordings Dataset Analysis Report");
    let _ = writeln!(out, "Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));

    let _ = writeln!(out, "\n## Overall Statistics");
    let _ = writeln!(out, "- Total Annotations: {}", thousands(summary.total_annotations));
    let _ = writeln!(out, "- Unique Audio Files: {}", thousands(summary.unique_files));
    let _ = writeln!(out, "- Unique Countries: {}", summary.unique_countries);
    let _ = writeln!(out, "- Unique Cities: {}", summary.unique_cities);
    let _ = writeln!(out, "- Unique Annotators: {}", summary.unique_annotators);

    let _ = writeln!(out, "\n## Keep vs Skip Analysis");
    let _ = writeln!(
        out,
        "- Keep Annotations: {} ({:.1}%)",
        thousands(summary.keep_annotations),
        summary.keep_pct()
    );
    let _ = writeln!(
        out,
        "- Skip Annotations: {} ({:.1}%)",
        thousands(summary.skip_annotations),
        summary.skip_pct()
    );

    let sections: [(&str, &str, &[Count]); 7] = [
        ("Top 10 Countries by Annotations", "Country", top(&summary.per_country)),
        ("Top 10 Cities by Annotations", "City", top(&summary.per_city)),
        ("Annotator Statistics", "Annotator", summary.per_annotator.as_slice()),
        ("Emotion Distribution", "Emotion", summary.emotions.as_slice()),
        ("Audio Type Distribution", "Type", summary.types.as_slice()),
        ("MSA/Dialect Distribution", "MSA or Dialect?", summary.msa_or_dialect.as_slice()),
        ("Confidence Level Distribution", "Confidence", summary.confidence.as_slice()),
    ];
    for (title, header, counts) in sections {
        let _ = writeln!(out, "\n## {title}");
        count_table(&mut out, header, counts);
    }

    let d = &summary.duration_stats;
    let _ = writeln!(out, "\n## Duration Statistics");
    let _ = writeln!(out, "- Mean Duration: {}", seconds(d.mean));
    let _ = writeln!(out, "- Median Duration: {}", seconds(d.median));
    let _ = writeln!(out, "- Min Duration: {}", seconds(d.min));
    let _ = writeln!(out, "- Max Duration: {}", seconds(d.max));

    let _ = writeln!(out, "\n## Annotator Agreement");
    let _ = writeln!(
        out,
        "- Files with 1 annotator: {}",
        thousands(summary.agreement.single_annotator_files)
    );
    let _ = writeln!(
        out,
        "- Files with 2+ annotators: {}",
        thousands(summary.agreement.multi_annotator_files)
    );

    let _ = writeln!(out, "\n## Geographic Coverage");
    let _ = writeln!(out, "- Countries with coordinates: {}", summary.countries_with_coordinates);
    let _ = writeln!(out, "- Cities with coordinates: {}", summary.cities_with_coordinates);
    let _ = writeln!(out, "- Rows geocoded: {}", thousands(geocoding.resolved));
    let _ = writeln!(
        out,
        "- Rows without coordinates (written as 0.0, 0.0): {}",
        thousands(geocoding.missing)
    );

    let _ = writeln!(out, "\n## Timeline");
    let _ = writeln!(out, "- Active days: {}", summary.daily_activity.per_day.len());
    let _ = writeln!(
        out,
        "- Unparseable timestamps: {}",
        thousands(summary.daily_activity.unparsed)
    );

    out
}

/// Renders the report and writes it to `path`.
pub fn save_summary_report(
    path: &Path,
    summary: &DatasetSummary,
    geocoding: &GeocodeSummary,
    generated_at: NaiveDateTime,
) -> Result<()> {
    let report = render(summary, geocoding, generated_at);
    std::fs::write(path, report).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), "Summary report saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AnnotationRecord;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_render_empty_dataset() {
        let summary = DatasetSummary::from_records(&[]);
        let report = render(&summary, &GeocodeSummary::default(), generated_at());

        assert!(report.contains("Generated on: 2024-06-01 12:00:00"));
        assert!(report.contains("- Total Annotations: 0"));
        assert!(report.contains("- Keep Annotations: 0 (0.0%)"));
        assert!(report.contains("- Mean Duration: n/a"));
        assert!(report.contains("_No data._"));
    }

    #[test]
    fn test_render_tables_and_totals() {
        let records: Vec<AnnotationRecord> = (0..12)
            .map(|i| AnnotationRecord {
                sound_filename: format!("{i}.wav"),
                country: format!("Country{i}"),
                city: "Cairo".to_string(),
                annotator: "ann1".to_string(),
                keep_or_skip: if i % 3 == 0 { "Skip" } else { "Keep" }.to_string(),
                duration_seconds: Some(i as f64),
                ..Default::default()
            })
            .collect();
        let summary = DatasetSummary::from_records(&records);
        let geocoding = GeocodeSummary {
            resolved: 0,
            missing: 12,
        };

        let report = render(&summary, &geocoding, generated_at());

        assert!(report.contains("- Total Annotations: 12"));
        assert!(report.contains("- Keep Annotations: 8 (66.7%)"));
        assert!(report.contains("- Skip Annotations: 4 (33.3%)"));
        assert!(report.contains("| ann1 | 12 |"));
        assert!(report.contains("- Median Duration: 5.50 seconds"));
        assert!(report.contains("- Rows without coordinates (written as 0.0, 0.0): 12"));

        // only the top 10 countries are listed
        let country_rows = report.lines().filter(|l| l.starts_with("| Country")).count();
        assert_eq!(country_rows, 1 + TOP_N);
    }

    #[test]
    fn test_render_ignores_non_finite_durations() {
        let records: Vec<AnnotationRecord> = [Some(10.0), Some(f64::NAN), Some(f64::INFINITY)]
            .into_iter()
            .map(|duration_seconds| AnnotationRecord {
                duration_seconds,
                ..Default::default()
            })
            .collect();
        let summary = DatasetSummary::from_records(&records);

        let report = render(&summary, &GeocodeSummary::default(), generated_at());

        assert!(report.contains("- Mean Duration: 10.00 seconds"));
        assert!(report.contains("- Max Duration: 10.00 seconds"));
        assert!(!report.contains("NaN"));
        assert!(!report.contains("inf"));
    }
}
