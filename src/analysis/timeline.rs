//! Daily annotation activity derived from the free-form timestamp column.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::collections::BTreeMap;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Truncates a timestamp to its calendar date.
///
/// Accepts RFC 3339 and the common naive layouts; zoned timestamps keep the
/// date of their own offset.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    pub per_day: BTreeMap<NaiveDate, usize>,
    /// Non-empty timestamps that matched no known layout.
    pub unparsed: usize,
}

impl DailyActivity {
    pub fn from_timestamps<'a>(timestamps: impl IntoIterator<Item = &'a str>) -> Self {
        let mut activity = Self::default();
        for raw in timestamps {
            match parse_date(raw) {
                Some(date) => *activity.per_day.entry(date).or_default() += 1,
                None if !raw.trim().is_empty() => activity.unparsed += 1,
                None => {}
            }
        }
        activity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_layouts() {
        assert_eq!(parse_date("2024-05-01 10:11:12"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01T23:59:59.123"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01T23:59:59+03:00"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("05/01/2024 08:00"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_daily_activity_counts_per_date() {
        let activity = DailyActivity::from_timestamps([
            "2024-05-02 09:00:00",
            "2024-05-01 10:00:00",
            "2024-05-01 18:30:00",
            "garbage",
            "",
        ]);

        let days: Vec<_> = activity.per_day.into_iter().collect();
        assert_eq!(days, vec![(date(2024, 5, 1), 2), (date(2024, 5, 2), 1)]);
        assert_eq!(activity.unparsed, 1);
    }
}
