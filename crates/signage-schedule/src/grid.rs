//! Timetable grid rows.
//!
//! The events timetable is a CSS grid with one header row followed by one
//! row per half hour from 8:00 to 20:00:
//!
//! ```text
//! row 1   header
//! row 2   08:00
//! row 3   08:30
//! row 4   09:00
//! ...
//! row 26  20:00
//! ```
//!
//! A time maps to the row of the half-hour slot it falls in, so 09:15 shares
//! row 4 with 09:00 and 09:30 starts row 5.

use chrono::{NaiveTime, Timelike};

/// First hour shown on the timetable.
pub const DISPLAY_START_HOUR: u32 = 8;

/// Last hour shown on the timetable (inclusive, on the hour).
pub const DISPLAY_END_HOUR: u32 = 20;

/// Grid row of the first half-hour slot (row 1 is the header).
const FIRST_SLOT_ROW: u32 = 2;

/// Rows per hour.
const ROWS_PER_HOUR: u32 = 2;

/// Returns `true` if `[start, end]` lies inside the closed 8:00-20:00 window.
#[must_use]
pub fn within_display_window(start: NaiveTime, end: NaiveTime) -> bool {
    let starts_in_window = start.hour() >= DISPLAY_START_HOUR;
    let ends_in_window = end.hour() < DISPLAY_END_HOUR
        || (end.hour() == DISPLAY_END_HOUR && end.minute() == 0 && end.second() == 0);
    starts_in_window && ends_in_window && start <= end
}

/// Returns the grid row for a time of day.
///
/// `row = (hour - 8) * 2 + 2`, plus one when `minute >= 30`. Times before
/// 8:00 clamp to the first slot row.
#[must_use]
pub fn css_grid_row(time: NaiveTime) -> u32 {
    let half_hour = u32::from(time.minute() >= 30);
    time.hour()
        .saturating_sub(DISPLAY_START_HOUR)
        .saturating_mul(ROWS_PER_HOUR)
        .saturating_add(FIRST_SLOT_ROW)
        .saturating_add(half_hour)
}
