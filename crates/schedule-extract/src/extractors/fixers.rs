//! Fixed-offset reader around the "Fixers" trade column
//!
//! The programme export this targets lays each trade row out as
//! consecutive OCR lines:
//!
//! ```text
//! i-2  level        "Level 2"
//! i-1  task         "2nd Fix"
//! i    anchor       "Fixers"
//! i+1  progress     "0%"          (never read)
//! i+2  start date   "01/03/2024"
//! i+3  finish date  "15/03/2024"
//! ```

use crate::diagnostics::{ExtractionSink, SkipReason, SkippedRow};
use crate::patterns::{
    is_anchor, is_schedule_date, DatePolicy, END_OFFSET, LEVEL_OFFSET, START_OFFSET, TASK_OFFSET,
};
use crate::{ScheduleParser, TaskRecord};

/// Reads rows at fixed offsets around each anchor line
#[derive(Debug, Clone, Copy, Default)]
pub struct FixersAnchorParser {
    pub date_policy: DatePolicy,
}

impl FixersAnchorParser {
    pub fn new(date_policy: DatePolicy) -> Self {
        Self { date_policy }
    }

    /// Scan `lines` once, admitting rows whose start and end cells are dates
    pub fn extract<S: AsRef<str>>(
        &self,
        lines: &[S],
        sink: &mut dyn ExtractionSink,
    ) -> Vec<TaskRecord> {
        let mut records = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            if !is_anchor(line.as_ref()) {
                continue;
            }

            let level = cell(lines, index, LEVEL_OFFSET);
            let task = cell(lines, index, TASK_OFFSET);
            let start = cell(lines, index, START_OFFSET);
            let end = cell(lines, index, END_OFFSET);

            let start_ok = is_schedule_date(&start, self.date_policy);
            let end_ok = is_schedule_date(&end, self.date_policy);

            match SkipReason::from_checks(start_ok, end_ok) {
                None => records.push(TaskRecord {
                    level,
                    task,
                    start,
                    end,
                }),
                Some(reason) => sink.row_skipped(&SkippedRow {
                    anchor_index: index,
                    level,
                    task,
                    start,
                    end,
                    reason,
                }),
            }
        }

        records
    }
}

impl ScheduleParser for FixersAnchorParser {
    fn parse(&self, lines: &[String], sink: &mut dyn ExtractionSink) -> Vec<TaskRecord> {
        self.extract(lines, sink)
    }
}

/// Trimmed line at `anchor + offset`, or empty when that falls outside `lines`
fn cell<S: AsRef<str>>(lines: &[S], anchor: usize, offset: isize) -> String {
    anchor
        .checked_add_signed(offset)
        .and_then(|index| lines.get(index))
        .map(|line| line.as_ref().trim().to_string())
        .unwrap_or_default()
}
