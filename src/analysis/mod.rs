//! Aggregate statistics over the merged annotation dataset.
//!
//! Everything here is a pure function of the records; the charts and the
//! Markdown report both read from a single [`summary::DatasetSummary`].

pub mod counts;
pub mod summary;
pub mod timeline;
pub mod utility;
