//! Anchor and date patterns for programme scans

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

/// Line value that marks a trade row in the programme table
pub const ANCHOR: &str = "Fixers";

/// Line offset of the level column, relative to the anchor
pub const LEVEL_OFFSET: isize = -2;

/// Line offset of the task description, relative to the anchor
pub const TASK_OFFSET: isize = -1;

/// Line offset of the start date. Offset +1 holds the progress percentage.
pub const START_OFFSET: isize = 2;

/// Line offset of the finish date
pub const END_OFFSET: isize = 3;

lazy_static! {
    /// Two digits, slash, two digits, slash, four digits (ASCII only)
    static ref DATE_PATTERN: Regex = Regex::new(r"^[0-9]{2}/[0-9]{2}/[0-9]{4}$").unwrap();
}

/// How strictly candidate dates are checked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePolicy {
    /// Shape only: `99/99/9999` passes
    #[default]
    Format,
    /// Shape plus a real calendar day
    Calendar,
}

/// True when `line`, after trimming, is exactly the anchor token
pub fn is_anchor(line: &str) -> bool {
    line.trim() == ANCHOR
}

/// Check a trimmed date cell against the policy
pub fn is_schedule_date(value: &str, policy: DatePolicy) -> bool {
    if !DATE_PATTERN.is_match(value) {
        return false;
    }

    match policy {
        DatePolicy::Format => true,
        DatePolicy::Calendar => NaiveDate::parse_from_str(value, "%d/%m/%Y").is_ok(),
    }
}
