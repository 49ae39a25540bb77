//! Diagnostics for candidate rows the extractor drops
//!
//! Dropping a row is not an error: OCR noise regularly produces anchor
//! lines that are not real table rows. Each drop is reported through an
//! [`ExtractionSink`] so callers can log it, count it, or assert on it.

use serde::Serialize;

/// Which date cell failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    InvalidStart,
    InvalidEnd,
    InvalidBoth,
}

impl SkipReason {
    /// Build a reason from the two validation outcomes, `None` when both passed
    pub fn from_checks(start_ok: bool, end_ok: bool) -> Option<Self> {
        match (start_ok, end_ok) {
            (true, true) => None,
            (false, true) => Some(SkipReason::InvalidStart),
            (true, false) => Some(SkipReason::InvalidEnd),
            (false, false) => Some(SkipReason::InvalidBoth),
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::InvalidStart => write!(f, "invalid start date"),
            SkipReason::InvalidEnd => write!(f, "invalid end date"),
            SkipReason::InvalidBoth => write!(f, "invalid start and end dates"),
        }
    }
}

/// A candidate row that was read around an anchor but not admitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRow {
    /// Index of the anchor line in the input sequence
    pub anchor_index: usize,
    pub level: String,
    pub task: String,
    pub start: String,
    pub end: String,
    pub reason: SkipReason,
}

/// Receiver for extraction diagnostics
pub trait ExtractionSink {
    fn row_skipped(&mut self, row: &SkippedRow);
}

/// Default sink: one `tracing` debug event per dropped row
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ExtractionSink for TracingSink {
    fn row_skipped(&mut self, row: &SkippedRow) {
        tracing::debug!(
            anchor_index = row.anchor_index,
            level = %row.level,
            task = %row.task,
            start = %row.start,
            end = %row.end,
            reason = %row.reason,
            "Skipping schedule row"
        );
    }
}

/// Collects dropped rows in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub skipped: Vec<SkippedRow>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_skipped(self) -> Vec<SkippedRow> {
        self.skipped
    }
}

impl ExtractionSink for RecordingSink {
    fn row_skipped(&mut self, row: &SkippedRow) {
        self.skipped.push(row.clone());
    }
}

/// Forwards every event to two sinks
pub struct Tee<'a, A: ExtractionSink + ?Sized, B: ExtractionSink + ?Sized> {
    pub first: &'a mut A,
    pub second: &'a mut B,
}

impl<A: ExtractionSink + ?Sized, B: ExtractionSink + ?Sized> ExtractionSink for Tee<'_, A, B> {
    fn row_skipped(&mut self, row: &SkippedRow) {
        self.first.row_skipped(row);
        self.second.row_skipped(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(reason: SkipReason) -> SkippedRow {
        SkippedRow {
            anchor_index: 4,
            level: "Level 1".to_string(),
            task: "1st Fix".to_string(),
            start: "2025-01-01".to_string(),
            end: "31/12/2025".to_string(),
            reason,
        }
    }

    #[test]
    fn test_reason_from_checks() {
        assert_eq!(SkipReason::from_checks(true, true), None);
        assert_eq!(
            SkipReason::from_checks(false, true),
            Some(SkipReason::InvalidStart)
        );
        assert_eq!(
            SkipReason::from_checks(true, false),
            Some(SkipReason::InvalidEnd)
        );
        assert_eq!(
            SkipReason::from_checks(false, false),
            Some(SkipReason::InvalidBoth)
        );
    }

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        sink.row_skipped(&sample_row(SkipReason::InvalidStart));
        sink.row_skipped(&sample_row(SkipReason::InvalidEnd));

        let reasons: Vec<_> = sink.into_skipped().iter().map(|r| r.reason).collect();
        assert_eq!(reasons, vec![SkipReason::InvalidStart, SkipReason::InvalidEnd]);
    }

    #[test]
    fn test_tee_forwards_to_both() {
        let mut a = RecordingSink::new();
        let mut b = RecordingSink::new();
        {
            let mut tee = Tee {
                first: &mut a,
                second: &mut b,
            };
            tee.row_skipped(&sample_row(SkipReason::InvalidBoth));
        }
        assert_eq!(a.skipped.len(), 1);
        assert_eq!(b.skipped, a.skipped);
    }

    #[test]
    fn test_skipped_row_serializes_reason_snake_case() {
        let json = serde_json::to_value(sample_row(SkipReason::InvalidStart)).unwrap();
        assert_eq!(json["reason"], "invalid_start");
        assert_eq!(json["anchor_index"], 4);
    }
}
