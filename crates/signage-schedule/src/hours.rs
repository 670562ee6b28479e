//! Weekly hours normalization.
//!
//! The hours grid widget returns Sunday-start weeks. Signage shows a
//! Monday-start week, so Monday through Saturday are taken from the first
//! week and Sunday from the second.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use signage_api::widget::{HoursResponse, WidgetWeek};
use tracing::instrument;

use crate::dates::format_day;

/// Number of weeks requested from the hours widget.
pub const HOURS_WEEKS: u32 = 2;

/// Number of days in a widget week.
const DAYS_PER_WEEK: usize = 7;

/// Number of days shown in the left column of the two-column layout.
const LEFT_COLUMN_DAYS: usize = 4;

/// Weekdays taken from the first widget week.
const FIRST_WEEK_DAYS: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Returns the English weekday name used as a widget week key.
#[must_use]
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Hours for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayHours {
    /// Calendar date.
    pub date: NaiveDate,
    /// Day of week.
    pub weekday: Weekday,
    /// Pre-rendered hours string from the widget (e.g. `"10am - 4pm"`).
    pub rendered_hours: String,
}

impl DayHours {
    /// Creates a new `DayHours`.
    #[must_use]
    pub fn new(date: NaiveDate, weekday: Weekday, rendered_hours: impl Into<String>) -> Self {
        Self {
            date,
            weekday,
            rendered_hours: rendered_hours.into(),
        }
    }

    /// Returns the full weekday name (e.g. `"Monday"`).
    #[must_use]
    pub const fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }

    /// Returns the date as `YYYY-MM-DD`.
    #[must_use]
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// A Monday-to-Sunday week of hours.
///
/// Always holds exactly seven days in ascending date order covering one
/// contiguous span. Only `normalize_hours` constructs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyHours {
    days: [DayHours; DAYS_PER_WEEK],
}

impl WeeklyHours {
    /// Returns the seven days, Monday first.
    #[must_use]
    pub const fn days(&self) -> &[DayHours; DAYS_PER_WEEK] {
        &self.days
    }

    /// Consumes the week and returns its days.
    #[must_use]
    pub fn into_days(self) -> [DayHours; DAYS_PER_WEEK] {
        self.days
    }

    /// Returns Monday.
    #[must_use]
    pub const fn first(&self) -> &DayHours {
        let [first, ..] = &self.days;
        first
    }

    /// Returns Sunday.
    #[must_use]
    pub const fn last(&self) -> &DayHours {
        let [.., last] = &self.days;
        last
    }

    /// Returns the header date range, e.g. `("Feb 05", "Feb 11")`.
    #[must_use]
    pub fn date_range(&self) -> (String, String) {
        (format_day(self.first().date), format_day(self.last().date))
    }

    /// Splits the week for the two-column layout (Mon-Thu, Fri-Sun).
    #[must_use]
    pub fn columns(&self) -> (&[DayHours], &[DayHours]) {
        self.days.split_at(LEFT_COLUMN_DAYS)
    }

    /// Returns the position of `today` in the week, if it falls inside it.
    #[must_use]
    pub fn today_index(&self, today: NaiveDate) -> Option<usize> {
        self.days.iter().position(|day| day.date == today)
    }
}

/// Reasons an hours grid response cannot be normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoursError {
    /// The requested location key is absent from the response.
    LocationNotFound(String),
    /// The response does not hold exactly one location.
    LocationCount(usize),
    /// The location does not hold exactly two weeks.
    WeekCount(usize),
    /// A week does not hold exactly seven days.
    DayCount {
        /// Week number (1-based).
        week: usize,
        /// Number of days found.
        count: usize,
    },
    /// A weekday key is absent from a week.
    MissingDay {
        /// Week number (1-based).
        week: usize,
        /// Missing weekday.
        weekday: Weekday,
    },
    /// A day's date is not `YYYY-MM-DD`.
    InvalidDate(String),
    /// The selected days do not form one Monday-to-Sunday span.
    NotContiguous,
}

impl fmt::Display for HoursError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationNotFound(key) => write!(f, "location {key} not found in response"),
            Self::LocationCount(count) => write!(f, "expected 1 location, found {count}"),
            Self::WeekCount(count) => write!(f, "expected 2 weeks, found {count}"),
            Self::DayCount { week, count } => {
                write!(f, "expected 7 days in week {week}, found {count}")
            }
            Self::MissingDay { week, weekday } => {
                write!(f, "week {week} has no {}", weekday_name(*weekday))
            }
            Self::InvalidDate(date) => write!(f, "invalid date: {date}"),
            Self::NotContiguous => write!(f, "days do not form a Monday-to-Sunday week"),
        }
    }
}

impl std::error::Error for HoursError {}

/// Narrows a hours grid response to a single location.
///
/// The widget can return several locations; signage only shows the one it
/// asked for.
///
/// # Errors
///
/// Returns `HoursError::LocationNotFound` if `loc_<location_id>` is absent.
pub fn select_location(
    mut response: HoursResponse,
    location_id: u32,
) -> Result<HoursResponse, HoursError> {
    let key = HoursResponse::location_key(location_id);
    let (key, location) = response
        .locations
        .remove_entry(&key)
        .ok_or(HoursError::LocationNotFound(key))?;

    let mut selected = HoursResponse::default();
    selected.locations.insert(key, location);
    Ok(selected)
}

/// Flattens a single-location, two-week hours grid into a Monday-start week.
///
/// # Errors
///
/// Returns an `HoursError` describing the first structural anomaly found:
/// a location count other than one, a week count other than two, a week
/// without exactly seven days, a missing weekday, an unparsable date, or
/// dates that do not form one contiguous Monday-to-Sunday span.
#[instrument(skip_all)]
pub fn normalize_hours(response: &HoursResponse) -> Result<WeeklyHours, HoursError> {
    let mut locations = response.locations.values();
    let (Some(location), None) = (locations.next(), locations.next()) else {
        return Err(HoursError::LocationCount(response.locations.len()));
    };

    let [first_week, second_week] = location.weeks.as_slice() else {
        return Err(HoursError::WeekCount(location.weeks.len()));
    };

    for (week, days) in [(1, first_week), (2, second_week)] {
        if days.len() != DAYS_PER_WEEK {
            return Err(HoursError::DayCount {
                week,
                count: days.len(),
            });
        }
    }

    let mut days = Vec::with_capacity(DAYS_PER_WEEK);
    for weekday in FIRST_WEEK_DAYS {
        days.push(day_hours(first_week, 1, weekday)?);
    }
    days.push(day_hours(second_week, 2, Weekday::Sun)?);
    days.sort_by_key(|day| day.date);

    check_contiguous(&days)?;

    let days: [DayHours; DAYS_PER_WEEK] =
        days.try_into().map_err(|_| HoursError::NotContiguous)?;
    let week = WeeklyHours { days };

    tracing::debug!(
        location = %location.name,
        start = %week.first().iso_date(),
        end = %week.last().iso_date(),
        "Normalized weekly hours"
    );

    Ok(week)
}

/// Builds the `DayHours` for one weekday of a widget week.
fn day_hours(week: &WidgetWeek, number: usize, weekday: Weekday) -> Result<DayHours, HoursError> {
    let day = week
        .get(weekday_name(weekday))
        .ok_or(HoursError::MissingDay {
            week: number,
            weekday,
        })?;

    let date = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
        .map_err(|_| HoursError::InvalidDate(day.date.clone()))?;

    Ok(DayHours::new(date, weekday, day.rendered.as_str()))
}

/// Verifies sorted days start on Monday, advance one day at a time, and
/// each date falls on its weekday.
fn check_contiguous(days: &[DayHours]) -> Result<(), HoursError> {
    let Some(first) = days.first() else {
        return Err(HoursError::NotContiguous);
    };
    if first.date.weekday() != Weekday::Mon {
        return Err(HoursError::NotContiguous);
    }
    if days.iter().any(|day| day.date.weekday() != day.weekday) {
        return Err(HoursError::NotContiguous);
    }

    let advances_by_one = days.windows(2).all(|pair| match pair {
        [prev, next] => prev.date.checked_add_days(Days::new(1)) == Some(next.date),
        _ => false,
    });
    if !advances_by_one {
        return Err(HoursError::NotContiguous);
    }

    Ok(())
}
