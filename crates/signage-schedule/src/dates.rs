//! Date formatting for the schedule header.

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::hours::DayHours;

/// Formats a date as `"Mon DD"` (e.g. `"Feb 04"`).
#[must_use]
pub fn format_day(date: NaiveDate) -> String {
    date.format("%b %d").to_string()
}

/// Formats an ISO date string (`YYYY-MM-DD`) as `"Mon DD"`.
///
/// # Errors
///
/// Returns an error if `iso` is not a valid `YYYY-MM-DD` date.
pub fn format_date(iso: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .with_context(|| format!("invalid date format: {iso}"))?;
    Ok(format_day(date))
}

/// Returns the formatted first and last dates of a sorted list of days.
///
/// A single day yields the same start and end; an empty list yields `None`.
#[must_use]
pub fn start_end_dates(days: &[DayHours]) -> Option<(String, String)> {
    let first = days.first()?;
    let last = days.last()?;
    Some((format_day(first.date), format_day(last.date)))
}
