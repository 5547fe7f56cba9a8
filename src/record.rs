//! The annotation row shared by every pipeline stage.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Value of the keep/skip column marking a usable recording.
pub const KEEP: &str = "Keep";
/// Value of the keep/skip column marking a rejected recording.
pub const SKIP: &str = "Skip";

/// Input columns with a typed field, in output order.
pub const COLUMNS: [&str; 11] = [
    "Sound filename",
    "Country",
    "City",
    "Annotator",
    "Keep or skip",
    "Emotion",
    "Type",
    "MSA or Dialect?",
    "Confidence",
    "Duration (seconds)",
    "Timestamp",
];

/// Columns filled in by the geocoder, always written last.
pub const COORDINATE_COLUMNS: [&str; 2] = ["Latitude", "Longitude"];

/// One annotator's judgement of one recording.
///
/// Text columns missing from an input file deserialize as empty strings, and
/// empty strings are treated as missing values by every aggregation. Columns
/// without a typed field are carried in `extra` so they survive to the output.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnnotationRecord {
    #[serde(rename = "Sound filename", default)]
    pub sound_filename: String,
    #[serde(rename = "Country", default)]
    pub country: String,
    #[serde(rename = "City", default)]
    pub city: String,
    #[serde(rename = "Annotator", default)]
    pub annotator: String,
    #[serde(rename = "Keep or skip", default)]
    pub keep_or_skip: String,
    #[serde(rename = "Emotion", default)]
    pub emotion: String,
    #[serde(rename = "Type", default)]
    pub audio_type: String,
    #[serde(rename = "MSA or Dialect?", default)]
    pub msa_or_dialect: String,
    #[serde(rename = "Confidence", default)]
    pub confidence: String,
    #[serde(
        rename = "Duration (seconds)",
        default,
        deserialize_with = "finite_duration"
    )]
    pub duration_seconds: Option<f64>,
    #[serde(rename = "Timestamp", default)]
    pub timestamp: String,

    // Derived by the geocoder; incoming values are ignored.
    #[serde(skip)]
    pub latitude: f64,
    #[serde(skip)]
    pub longitude: f64,

    /// Cells of untyped columns, keyed by header.
    #[serde(skip)]
    pub extra: BTreeMap<String, String>,
}

/// Like `csv::invalid_option`, but `NaN` and infinite cells also read as missing.
fn finite_duration<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<f64> = csv::invalid_option(deserializer)?;
    Ok(value.filter(|v| v.is_finite()))
}

/// Whether `header` is a column with a typed field or a derived coordinate.
pub fn is_known_column(header: &str) -> bool {
    COLUMNS.contains(&header) || COORDINATE_COLUMNS.contains(&header)
}

/// Identity of a record for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey<'a> {
    pub sound_filename: &'a str,
    pub country: &'a str,
    pub city: &'a str,
    pub annotator: &'a str,
}

impl AnnotationRecord {
    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            sound_filename: &self.sound_filename,
            country: &self.country,
            city: &self.city,
            annotator: &self.annotator,
        }
    }

    pub fn is_keep(&self) -> bool {
        self.keep_or_skip == KEEP
    }

    pub fn is_skip(&self) -> bool {
        self.keep_or_skip == SKIP
    }

    /// Whether the geocoder left the (0.0, 0.0) placeholder on this row.
    pub fn has_sentinel_coordinates(&self) -> bool {
        self.latitude == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keep_is_exact_match() {
        let mut record = AnnotationRecord {
            keep_or_skip: "Keep".to_string(),
            ..Default::default()
        };
        assert!(record.is_keep());
        assert!(!record.is_skip());

        record.keep_or_skip = "keep".to_string();
        assert!(!record.is_keep());
    }

    #[test]
    fn test_key_ignores_non_identity_columns() {
        let a = AnnotationRecord {
            sound_filename: "a.wav".to_string(),
            country: "Egypt".to_string(),
            city: "Cairo".to_string(),
            annotator: "ann1".to_string(),
            emotion: "Happy".to_string(),
            ..Default::default()
        };
        let b = AnnotationRecord {
            emotion: "Sad".to_string(),
            ..a.clone()
        };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_deserialize_with_missing_and_bad_cells() {
        let data = "Sound filename,Country,City,Annotator,Duration (seconds)\n\
                    a.wav,Egypt,Cairo,ann1,n/a\n\
                    b.wav,Egypt,Cairo,ann1,12.5\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<AnnotationRecord> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].duration_seconds, None);
        assert_eq!(rows[1].duration_seconds, Some(12.5));
        assert_eq!(rows[0].emotion, "");
        assert_eq!(rows[0].latitude, 0.0);
    }

    #[test]
    fn test_non_finite_durations_read_as_missing() {
        let data = "Sound filename,Duration (seconds)\n\
                    a.wav,NaN\n\
                    b.wav,nan\n\
                    c.wav,inf\n\
                    d.wav,-infinity\n\
                    e.wav,7\n";
        let mut rdr = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<AnnotationRecord> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        let durations: Vec<_> = rows.iter().map(|r| r.duration_seconds).collect();
        assert_eq!(durations, vec![None, None, None, None, Some(7.0)]);
    }

    #[test]
    fn test_known_columns() {
        assert!(is_known_column("Timestamp"));
        assert!(is_known_column("Latitude"));
        assert!(!is_known_column("Notes"));
    }
}
