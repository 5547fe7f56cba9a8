pub mod analysis;
pub mod charts;
pub mod geocode;
pub mod loader;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod report;
