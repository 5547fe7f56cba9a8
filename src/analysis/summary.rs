//! Aggregate statistics over the merged dataset.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::analysis::counts::{Count, CrossTab, distinct_count, value_counts};
use crate::analysis::timeline::DailyActivity;
use crate::analysis::utility::{max, mean, median, min, pct};
use crate::record::AnnotationRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DurationStats {
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl DurationStats {
    pub fn from_values(values: &[f64]) -> Self {
        Self {
            mean: mean(values),
            median: median(values),
            min: min(values),
            max: max(values),
        }
    }
}

/// How many distinct annotators looked at each (file, country, city) group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AgreementStats {
    /// Number of annotators → number of files.
    pub distribution: BTreeMap<usize, usize>,
    pub single_annotator_files: usize,
    pub multi_annotator_files: usize,
}

impl AgreementStats {
    pub fn from_records(records: &[AnnotationRecord]) -> Self {
        let mut groups: HashMap<(&str, &str, &str), HashSet<&str>> = HashMap::new();
        for r in records {
            // rows missing any part of the group key, or the annotator, are not counted
            if [&r.sound_filename, &r.country, &r.city, &r.annotator]
                .iter()
                .any(|v| v.is_empty())
            {
                continue;
            }
            groups
                .entry((r.sound_filename.as_str(), r.country.as_str(), r.city.as_str()))
                .or_default()
                .insert(r.annotator.as_str());
        }

        let mut stats = Self::default();
        for annotators in groups.values() {
            *stats.distribution.entry(annotators.len()).or_default() += 1;
        }
        stats.single_annotator_files = stats.distribution.get(&1).copied().unwrap_or(0);
        stats.multi_annotator_files = stats.distribution.range(2..).map(|(_, n)| n).sum();
        stats
    }
}

/// Keep/skip tallies for one country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeepSkipByCountry {
    pub country: String,
    pub keep: usize,
    pub skip: usize,
}

/// Everything the report and charts need, computed once.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_annotations: usize,
    pub unique_files: usize,
    pub unique_countries: usize,
    pub unique_cities: usize,
    pub unique_annotators: usize,

    pub keep_annotations: usize,
    pub skip_annotations: usize,

    pub per_annotator: Vec<Count>,
    pub per_country: Vec<Count>,
    pub per_city: Vec<Count>,
    pub keep_or_skip: Vec<Count>,
    pub emotions: Vec<Count>,
    pub types: Vec<Count>,
    pub msa_or_dialect: Vec<Count>,
    pub confidence: Vec<Count>,

    pub durations: Vec<f64>,
    pub duration_stats: DurationStats,

    pub emotion_by_type: CrossTab,
    pub agreement: AgreementStats,
    pub daily_activity: DailyActivity,
    pub keep_skip_by_country: Vec<KeepSkipByCountry>,

    /// Distinct countries among rows that carry real coordinates.
    pub countries_with_coordinates: usize,
    pub cities_with_coordinates: usize,
}

impl DatasetSummary {
    pub fn from_records(records: &[AnnotationRecord]) -> Self {
        macro_rules! column {
            ($field:ident) => {
                records.iter().map(|r| r.$field.as_str())
            };
        }

        let durations: Vec<f64> = records
            .iter()
            .filter_map(|r| r.duration_seconds)
            .filter(|d| d.is_finite())
            .collect();
        let geocoded: Vec<&AnnotationRecord> = records
            .iter()
            .filter(|r| !r.has_sentinel_coordinates())
            .collect();

        Self {
            total_annotations: records.len(),
            unique_files: distinct_count(column!(sound_filename)),
            unique_countries: distinct_count(column!(country)),
            unique_cities: distinct_count(column!(city)),
            unique_annotators: distinct_count(column!(annotator)),

            keep_annotations: records.iter().filter(|r| r.is_keep()).count(),
            skip_annotations: records.iter().filter(|r| r.is_skip()).count(),

            per_annotator: value_counts(column!(annotator)),
            per_country: value_counts(column!(country)),
            per_city: value_counts(column!(city)),
            keep_or_skip: value_counts(column!(keep_or_skip)),
            emotions: value_counts(column!(emotion)),
            types: value_counts(column!(audio_type)),
            msa_or_dialect: value_counts(column!(msa_or_dialect)),
            confidence: value_counts(column!(confidence)),

            duration_stats: DurationStats::from_values(&durations),
            durations,

            emotion_by_type: CrossTab::from_pairs(
                records
                    .iter()
                    .map(|r| (r.emotion.as_str(), r.audio_type.as_str())),
            ),
            agreement: AgreementStats::from_records(records),
            daily_activity: DailyActivity::from_timestamps(column!(timestamp)),
            keep_skip_by_country: keep_skip_by_country(records),

            countries_with_coordinates: distinct_count(geocoded.iter().map(|r| r.country.as_str())),
            cities_with_coordinates: distinct_count(geocoded.iter().map(|r| r.city.as_str())),
        }
    }

    pub fn keep_pct(&self) -> f64 {
        pct(self.keep_annotations, self.total_annotations)
    }

    pub fn skip_pct(&self) -> f64 {
        pct(self.skip_annotations, self.total_annotations)
    }
}

/// Keep/skip counts per country, ordered by total annotations.
fn keep_skip_by_country(records: &[AnnotationRecord]) -> Vec<KeepSkipByCountry> {
    let order = value_counts(records.iter().map(|r| r.country.as_str()));
    let mut tallies: HashMap<&str, (usize, usize)> = HashMap::new();
    for r in records {
        let entry = tallies.entry(r.country.as_str()).or_default();
        if r.is_keep() {
            entry.0 += 1;
        } else if r.is_skip() {
            entry.1 += 1;
        }
    }

    order
        .into_iter()
        .map(|c| {
            let (keep, skip) = tallies.get(c.label.as_str()).copied().unwrap_or_default();
            KeepSkipByCountry {
                country: c.label,
                keep,
                skip,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file: &str, city: &str, annotator: &str, keep: &str) -> AnnotationRecord {
        AnnotationRecord {
            sound_filename: file.to_string(),
            country: "Egypt".to_string(),
            city: city.to_string(),
            annotator: annotator.to_string(),
            keep_or_skip: keep.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_dataset() {
        let summary = DatasetSummary::from_records(&[]);
        assert_eq!(summary.total_annotations, 0);
        assert_eq!(summary.keep_pct(), 0.0);
        assert_eq!(summary.duration_stats, DurationStats::default());
        assert!(summary.emotion_by_type.is_empty());
    }

    #[test]
    fn test_totals_and_keep_skip() {
        let records = vec![
            record("1.wav", "Cairo", "a", "Keep"),
            record("1.wav", "Cairo", "b", "Skip"),
            record("2.wav", "Alexandria", "a", "Keep"),
            record("3.wav", "", "c", ""),
        ];

        let summary = DatasetSummary::from_records(&records);
        assert_eq!(summary.total_annotations, 4);
        assert_eq!(summary.unique_files, 3);
        assert_eq!(summary.unique_countries, 1);
        assert_eq!(summary.unique_cities, 2);
        assert_eq!(summary.unique_annotators, 3);
        assert_eq!(summary.keep_annotations, 2);
        assert_eq!(summary.skip_annotations, 1);
        assert_eq!(summary.keep_pct(), 50.0);
        assert_eq!(summary.skip_pct(), 25.0);
        assert_eq!(
            summary.keep_skip_by_country,
            vec![KeepSkipByCountry {
                country: "Egypt".to_string(),
                keep: 2,
                skip: 1,
            }]
        );
    }

    #[test]
    fn test_agreement() {
        let records = vec![
            record("1.wav", "Cairo", "a", "Keep"),
            record("1.wav", "Cairo", "b", "Keep"),
            record("1.wav", "Cairo", "c", "Keep"),
            record("2.wav", "Cairo", "a", "Keep"),
            record("3.wav", "Cairo", "a", "Keep"),
            record("3.wav", "Cairo", "b", "Keep"),
        ];

        let agreement = AgreementStats::from_records(&records);
        assert_eq!(
            agreement.distribution,
            BTreeMap::from([(1, 1), (2, 1), (3, 1)])
        );
        assert_eq!(agreement.single_annotator_files, 1);
        assert_eq!(agreement.multi_annotator_files, 2);
    }

    #[test]
    fn test_agreement_ignores_incomplete_rows() {
        let records = vec![
            record("1.wav", "Cairo", "a", "Keep"),
            record("1.wav", "Cairo", "", "Keep"),
            record("2.wav", "Cairo", "", "Keep"),
            record("", "Cairo", "a", "Keep"),
            record("3.wav", "", "a", "Keep"),
        ];

        let agreement = AgreementStats::from_records(&records);
        assert_eq!(agreement.distribution, BTreeMap::from([(1, 1)]));
        assert!(!agreement.distribution.contains_key(&0));
        assert_eq!(agreement.single_annotator_files, 1);
        assert_eq!(agreement.multi_annotator_files, 0);
    }

    #[test]
    fn test_durations_skip_missing() {
        let mut records = vec![record("1.wav", "Cairo", "a", "Keep"); 3];
        records[0].duration_seconds = Some(10.0);
        records[2].duration_seconds = Some(20.0);

        let summary = DatasetSummary::from_records(&records);
        assert_eq!(summary.durations, vec![10.0, 20.0]);
        assert_eq!(summary.duration_stats.mean, Some(15.0));
        assert_eq!(summary.duration_stats.median, Some(15.0));
    }

    #[test]
    fn test_durations_skip_non_finite() {
        let mut records = vec![record("1.wav", "Cairo", "a", "Keep"); 4];
        records[0].duration_seconds = Some(10.0);
        records[1].duration_seconds = Some(f64::NAN);
        records[2].duration_seconds = Some(f64::INFINITY);
        records[3].duration_seconds = Some(20.0);

        let summary = DatasetSummary::from_records(&records);
        assert_eq!(summary.durations, vec![10.0, 20.0]);
        assert_eq!(summary.duration_stats.mean, Some(15.0));
        assert_eq!(summary.duration_stats.max, Some(20.0));
    }

    #[test]
    fn test_coverage_excludes_sentinel_rows() {
        let mut records = vec![
            record("1.wav", "Cairo", "a", "Keep"),
            record("2.wav", "unknown_city", "a", "Keep"),
        ];
        records[0].latitude = 30.0626;
        records[0].longitude = 31.2497;

        let summary = DatasetSummary::from_records(&records);
        assert_eq!(summary.countries_with_coordinates, 1);
        assert_eq!(summary.cities_with_coordinates, 1);
    }
}
