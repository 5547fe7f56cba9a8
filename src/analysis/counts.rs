//! Frequency counts and cross-tabulations over text columns.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// A label and how many rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub label: String,
    pub count: usize,
}

/// Counts occurrences of each non-empty value.
///
/// Sorted by descending count; equal counts keep first-seen order.
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Count> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<Count> = Vec::new();

    for value in values {
        if value.is_empty() {
            continue;
        }
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(Count {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Number of distinct non-empty values.
pub fn distinct_count<'a>(values: impl IntoIterator<Item = &'a str>) -> usize {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Row label × column label counts, with both axes sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossTab {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    /// `cells[r][c]` counts pairs (`rows[r]`, `columns[c]`).
    pub cells: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Tabulates pairs, skipping any pair with an empty side.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut tally: BTreeMap<(&str, &str), usize> = BTreeMap::new();
        let mut rows = BTreeSet::new();
        let mut columns = BTreeSet::new();

        for (row, column) in pairs {
            if row.is_empty() || column.is_empty() {
                continue;
            }
            *tally.entry((row, column)).or_default() += 1;
            rows.insert(row);
            columns.insert(column);
        }

        let cells = rows
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| tally.get(&(*r, *c)).copied().unwrap_or(0))
                    .collect()
            })
            .collect();

        Self {
            rows: rows.into_iter().map(str::to_string).collect(),
            columns: columns.into_iter().map(str::to_string).collect(),
            cells,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn max_cell(&self) -> usize {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_counts_sorted_desc_ties_first_seen() {
        let counts = value_counts(["b", "a", "", "a", "c", "b", "a"]);
        let flat: Vec<_> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(flat, vec![("a", 3), ("b", 2), ("c", 1)]);

        let ties = value_counts(["y", "x", "z"]);
        let labels: Vec<_> = ties.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_distinct_count_ignores_empty() {
        assert_eq!(distinct_count(["a", "", "b", "a"]), 2);
        assert_eq!(distinct_count(Vec::<&str>::new()), 0);
    }

    #[test]
    fn test_crosstab() {
        let tab = CrossTab::from_pairs([
            ("Sad", "Song"),
            ("Happy", "Speech"),
            ("Happy", "Song"),
            ("Happy", "Song"),
            ("", "Song"),
        ]);

        assert_eq!(tab.rows, vec!["Happy", "Sad"]);
        assert_eq!(tab.columns, vec!["Song", "Speech"]);
        assert_eq!(tab.cells, vec![vec![2, 1], vec![1, 0]]);
        assert_eq!(tab.max_cell(), 2);
    }

    #[test]
    fn test_crosstab_empty() {
        let tab = CrossTab::from_pairs(Vec::new());
        assert!(tab.is_empty());
        assert_eq!(tab.max_cell(), 0);
    }
}
