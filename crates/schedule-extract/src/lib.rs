//! Schedule extraction from OCR'd construction programmes
//!
//! Turns the flat line sequence an OCR provider returns for a programme
//! scan into [`TaskRecord`]s. Rows are located by the `Fixers` trade
//! anchor and read at fixed offsets around it; see
//! [`extractors::fixers`] for the layout.
//!
//! Extraction never fails. Candidates whose dates do not validate are
//! dropped and reported through an [`ExtractionSink`].

pub mod diagnostics;
pub mod extractors;
pub mod lines;
pub mod patterns;

use serde::{Deserialize, Serialize};

pub use diagnostics::{ExtractionSink, RecordingSink, SkipReason, SkippedRow, TracingSink};
pub use extractors::FixersAnchorParser;
pub use lines::split_ocr_lines;
pub use patterns::DatePolicy;

/// One programme row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub level: String,
    pub task: String,
    /// `DD/MM/YYYY`
    pub start: String,
    /// `DD/MM/YYYY`
    pub end: String,
}

/// A heuristic that reads task rows out of an OCR line sequence
pub trait ScheduleParser: Send + Sync {
    fn parse(&self, lines: &[String], sink: &mut dyn ExtractionSink) -> Vec<TaskRecord>;
}

/// Options for [`extract_schedule_rows_with`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    pub date_policy: DatePolicy,
}

/// Extract rows with format-only date checks, logging drops via `tracing`
pub fn extract_schedule_rows<S: AsRef<str>>(lines: &[S]) -> Vec<TaskRecord> {
    extract_schedule_rows_with(lines, &ExtractOptions::default(), &mut TracingSink)
}

/// Extract rows, reporting drops to `sink`
pub fn extract_schedule_rows_with<S: AsRef<str>>(
    lines: &[S],
    options: &ExtractOptions,
    sink: &mut dyn ExtractionSink,
) -> Vec<TaskRecord> {
    FixersAnchorParser::new(options.date_policy).extract(lines, sink)
}
