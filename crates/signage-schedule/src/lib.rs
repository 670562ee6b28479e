//! Hours and events normalization for library digital signage.
//!
//! Turns raw LibCal widget responses into a Monday-start weekly schedule
//! and a list of events positioned on a fixed 8am-8pm timetable grid.

/// Date formatting for the schedule header.
pub mod dates;
/// Display view models assembled from widget data.
pub mod display;
/// Event list parsing and formatting.
pub mod events;
/// Timetable grid rows.
pub mod grid;
/// Weekly hours normalization.
pub mod hours;
/// Location lookup.
pub mod location;
/// Display orientation and URL construction.
pub mod orientation;

pub use dates::{format_date, format_day, start_end_dates};
pub use display::{
    EVENTS_ERROR_MESSAGE, HOURS_ERROR_MESSAGE, HoursDisplay, LocationEvents, collect_events,
    fetch_location_events, fetch_weekly_hours, load_hours_display,
};
pub use events::{
    Event, EventListing, EventsError, NO_EVENTS_SENTINEL, ParsedEvent, TITLE_LIMIT, TimeSpan,
    classify_time_range, format_events, parse_location_events, parse_time_range, truncate_title,
};
pub use grid::{css_grid_row, within_display_window};
pub use hours::{DayHours, HOURS_WEEKS, HoursError, WeeklyHours, normalize_hours, select_location};
pub use location::{Location, LocationDirectory};
pub use orientation::{Orientation, ParseOrientationError, display_url};
