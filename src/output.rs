//! Persistence of the merged dataset and its summary.
//!
//! Writes the combined and keep-only CSVs and logs the summary as JSON.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::analysis::summary::DatasetSummary;
use crate::record::{AnnotationRecord, COLUMNS, COORDINATE_COLUMNS};

/// Logs the summary as pretty-printed JSON.
pub fn print_json(summary: &DatasetSummary) -> Result<()> {
    debug!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Writes records to a CSV file with a header row, replacing any existing file.
///
/// Columns are the typed ones, then `extra_columns`, then the coordinates.
/// Records without a cell for an extra column get an empty one.
/// Returns the number of rows written.
pub fn write_records<'a>(
    path: &Path,
    extra_columns: &[String],
    records: impl IntoIterator<Item = &'a AnnotationRecord>,
) -> Result<usize> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(file);

    writer.write_record(
        COLUMNS
            .iter()
            .copied()
            .chain(extra_columns.iter().map(String::as_str))
            .chain(COORDINATE_COLUMNS),
    )?;

    let mut rows = 0;
    for record in records {
        writer.write_record(row(record, extra_columns))?;
        rows += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows, "Wrote CSV");
    Ok(rows)
}

/// Writes every record to the combined dataset file.
pub fn write_combined(
    path: &Path,
    extra_columns: &[String],
    records: &[AnnotationRecord],
) -> Result<usize> {
    let rows = write_records(path, extra_columns, records)?;
    info!(path = %path.display(), rows, "Combined annotations saved");
    Ok(rows)
}

/// Writes only the rows marked `Keep`.
pub fn write_keep_only(
    path: &Path,
    extra_columns: &[String],
    records: &[AnnotationRecord],
) -> Result<usize> {
    let rows = write_records(path, extra_columns, records.iter().filter(|r| r.is_keep()))?;
    info!(path = %path.display(), rows, "Filtered 'Keep' annotations saved");
    Ok(rows)
}

// Debug formatting keeps the trailing `.0` on whole numbers.
fn float(value: f64) -> String {
    format!("{value:?}")
}

fn row(record: &AnnotationRecord, extra_columns: &[String]) -> Vec<String> {
    let mut fields = vec![
        record.sound_filename.clone(),
        record.country.clone(),
        record.city.clone(),
        record.annotator.clone(),
        record.keep_or_skip.clone(),
        record.emotion.clone(),
        record.audio_type.clone(),
        record.msa_or_dialect.clone(),
        record.confidence.clone(),
        record.duration_seconds.map(float).unwrap_or_default(),
        record.timestamp.clone(),
    ];
    fields.extend(
        extra_columns
            .iter()
            .map(|c| record.extra.get(c).cloned().unwrap_or_default()),
    );
    fields.push(float(record.latitude));
    fields.push(float(record.longitude));
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn record(file: &str, keep: &str) -> AnnotationRecord {
        AnnotationRecord {
            sound_filename: file.to_string(),
            country: "Egypt".to_string(),
            city: "Cairo".to_string(),
            annotator: "ann1".to_string(),
            keep_or_skip: keep.to_string(),
            duration_seconds: Some(3.5),
            latitude: 30.0626,
            longitude: 31.2497,
            ..Default::default()
        }
    }

    #[test]
    fn test_print_json_does_not_panic() {
        let summary = DatasetSummary::default();
        print_json(&summary).unwrap();
    }

    #[test]
    fn test_row_matches_header_width() {
        let extra = vec!["Notes".to_string()];
        let fields = row(&record("a.wav", "Keep"), &extra);

        assert_eq!(fields.len(), COLUMNS.len() + extra.len() + COORDINATE_COLUMNS.len());
        assert_eq!(fields[9], "3.5");
        assert_eq!(fields[11], "");
        assert_eq!(&fields[12..], ["30.0626", "31.2497"]);
    }

    #[test]
    fn test_write_combined_and_keep_only() {
        let combined = temp_path("radio_annotations_test_combined.csv");
        let keep = temp_path("radio_annotations_test_keep.csv");
        let records = vec![
            record("a.wav", "Keep"),
            record("b.wav", "Skip"),
            record("c.wav", "Keep"),
        ];

        assert_eq!(write_combined(&combined, &[], &records).unwrap(), 3);
        assert_eq!(write_keep_only(&keep, &[], &records).unwrap(), 2);

        let content = fs::read_to_string(&combined).unwrap();
        assert_eq!(content.lines().count(), 4);
        assert!(content.contains("30.0626,31.2497"));
        assert!(content.lines().next().unwrap().ends_with("Latitude,Longitude"));

        let mut rdr = csv::Reader::from_path(&keep).unwrap();
        let rows: Vec<AnnotationRecord> = rdr.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.keep_or_skip == "Keep"));
        assert_eq!(rows[0].duration_seconds, Some(3.5));

        fs::remove_file(&combined).unwrap();
        fs::remove_file(&keep).unwrap();
    }

    #[test]
    fn test_extra_columns_written_before_coordinates() {
        let path = temp_path("radio_annotations_test_extra.csv");
        let mut noted = record("a.wav", "Keep");
        noted.extra.insert("Notes".to_string(), "clipped, then silence".to_string());
        let records = vec![noted, record("b.wav", "Keep")];
        let extra = vec!["Notes".to_string()];

        assert_eq!(write_combined(&path, &extra, &records).unwrap(), 2);

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers: Vec<String> = rdr.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(&headers[..11], COLUMNS);
        assert_eq!(&headers[11..], ["Notes", "Latitude", "Longitude"]);

        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(&rows[0][11], "clipped, then silence");
        assert_eq!(&rows[1][11], "");
        assert_eq!(&rows[1][12], "30.0626");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_empty_keeps_header() {
        let path = temp_path("radio_annotations_test_empty.csv");

        assert_eq!(write_keep_only(&path, &[], &[record("a.wav", "Skip")]).unwrap(), 0);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("Sound filename,"));
        assert!(content.trim_end().ends_with("Latitude,Longitude"));

        fs::remove_file(&path).unwrap();
    }
}
