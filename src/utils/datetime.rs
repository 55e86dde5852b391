//! Date and time helpers.
//!
//! Shared between the recurrence translator, the calendar importer and the
//! backup planner so every component formats dates the way the Todoist API
//! expects them.

use chrono::{NaiveDate, NaiveDateTime};

/// Date format used by the Todoist API for whole-day due dates.
pub const TODOIST_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp format embedded in backup filenames.
pub const BACKUP_STAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Format a date as `YYYY-MM-DD`.
pub fn format_ymd(date: NaiveDate) -> String {
    date.format(TODOIST_DATE_FORMAT).to_string()
}

/// Parse an ICS-style compact date (`YYYYMMDD`).
pub fn parse_compact_date(text: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(text, "%Y%m%d")
}

/// Parse an ICS-style compact date-time (`YYYYMMDDTHHMMSS`, optional
/// trailing `Z`). Case-insensitive, recurrence-rule values arrive
/// lower-cased.
pub fn parse_compact_datetime(text: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    let upper = text.to_uppercase();
    NaiveDateTime::parse_from_str(upper.trim_end_matches('Z'), "%Y%m%dT%H%M%S")
}
