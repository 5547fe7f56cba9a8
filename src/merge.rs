//! Concatenation and deduplication of loaded frames.

use std::collections::HashSet;

use crate::loader::Frame;
use crate::record::AnnotationRecord;

/// Concatenates the records of all frames in order of appearance.
pub fn concat_frames(frames: Vec<Frame>) -> Vec<AnnotationRecord> {
    let total = frames.iter().map(|f| f.records.len()).sum();
    let mut records = Vec::with_capacity(total);
    for frame in frames {
        records.extend(frame.records);
    }
    records
}

/// Union of the frames' untyped columns, in first-seen order.
pub fn extra_columns(frames: &[Frame]) -> Vec<String> {
    let mut seen = HashSet::new();
    frames
        .iter()
        .flat_map(|f| &f.extra_columns)
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect()
}

/// Drops records whose (filename, country, city, annotator) key reappears
/// later, keeping the last occurrence. Survivors keep their relative order.
pub fn dedup_last(records: Vec<AnnotationRecord>) -> Vec<AnnotationRecord> {
    let keep: Vec<bool> = {
        let mut seen = HashSet::with_capacity(records.len());
        let mut keep: Vec<bool> = records.iter().rev().map(|r| seen.insert(r.key())).collect();
        keep.reverse();
        keep
    };

    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}
