//! Date helpers for the on-disk task format.
//!
//! Tasks carry calendar dates only (no time component). Everything on disk
//! uses one fixed representation, `YYYY-MM-DD`, for both due dates and
//! completion dates.

use chrono::{Local, NaiveDate};

use crate::error::{Error, Result};

/// On-disk date representation for due and completion dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The normalized "current day" used for overdue/due comparisons and for
/// stamping completion dates.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Completion date recorded for checked lines that never wrote one
/// ("completed, date unknown").
pub fn unknown_completion() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid sentinel date")
}

/// Lenient parse used by the line decoder: a token that is not an exact
/// `YYYY-MM-DD` date is simply not a date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

/// Strict parse for user-supplied dates (CLI arguments).
pub fn parse_date_strict(text: &str) -> Result<NaiveDate> {
    parse_date(text).ok_or_else(|| Error::InvalidDate(text.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Human label for a date relative to `reference` ("today", "in 3 days",
/// "2 days ago"). Display-only.
pub fn relative_label(date: NaiveDate, reference: NaiveDate) -> String {
    let days = (date - reference).num_days();
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 0 => format!("in {d} days"),
        d => format!("{} days ago", -d),
    }
}
