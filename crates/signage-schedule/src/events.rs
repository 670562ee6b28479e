//! Event list parsing and formatting.
//!
//! The events widget returns an HTML fragment:
//!
//! ```text
//! <ul>
//!   <li><a href="...">Philosophy 31</a>
//!       <span>9:30am - 11:30am Monday, February 5, 2024</span></li>
//! </ul>
//! ```
//!
//! or a `No events are scheduled.` notice.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveTime;
use quick_xml::escape::unescape_with;
use regex::Regex;
use tracing::instrument;

use crate::grid::{css_grid_row, within_display_window};

/// Notice returned by the widget when a location has no events.
pub const NO_EVENTS_SENTINEL: &str = "No events are scheduled.";

/// Maximum number of characters of a title shown on the timetable.
pub const TITLE_LIMIT: usize = 40;

/// Separator between start and end in a time range.
const RANGE_SEPARATOR: &str = " - ";

/// Matches a list item and captures its body.
#[allow(clippy::expect_used)]
static ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li>").expect("failed to compile li regex"));

/// Matches an anchor and captures its body.
#[allow(clippy::expect_used)]
static ANCHOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<a\b[^>]*>(.*?)</a>").expect("failed to compile a regex"));

/// Matches a span and captures its body.
#[allow(clippy::expect_used)]
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<span\b[^>]*>(.*?)</span>").expect("failed to compile span regex")
});

/// Matches any tag.
#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("failed to compile tag regex"));

/// Matches a clock followed by a spaced meridiem (`"9:30 am"`).
#[allow(clippy::expect_used)]
static MERIDIEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d)\s+([ap]m)\b").expect("failed to compile meridiem regex")
});

/// An event as extracted from the widget markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEvent {
    /// Location the event belongs to.
    pub location_id: u32,
    /// Event title.
    pub title: String,
    /// Raw time range (e.g. `"9:30am - 11:30am Monday, February 5, 2024"`).
    pub time_range: String,
}

/// Result of parsing an events widget response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventListing {
    /// The widget reported that nothing is scheduled.
    NoEvents,
    /// One or more events.
    Events(Vec<ParsedEvent>),
}

impl EventListing {
    /// Returns the parsed events (empty for `NoEvents`).
    #[must_use]
    pub fn into_events(self) -> Vec<ParsedEvent> {
        match self {
            Self::NoEvents => Vec::new(),
            Self::Events(events) => events,
        }
    }
}

/// An event placed on the timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Location the event belongs to.
    pub location_id: u32,
    /// Event title.
    pub title: String,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time.
    pub end_time: NaiveTime,
    /// Grid row where the event starts.
    pub start_row: u32,
    /// Grid row where the event ends.
    pub end_row: u32,
}

impl Event {
    /// Returns the title truncated for the timetable.
    #[must_use]
    pub fn display_title(&self) -> String {
        truncate_title(&self.title, TITLE_LIMIT)
    }
}

/// Reasons an events widget response cannot be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsError {
    /// Neither the no-events notice nor any event list item was found.
    UnrecognizedMarkup,
    /// A time range could not be parsed.
    InvalidTimeRange(String),
}

impl fmt::Display for EventsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedMarkup => write!(f, "unrecognized events markup"),
            Self::InvalidTimeRange(range) => write!(f, "invalid time range: {range}"),
        }
    }
}

impl std::error::Error for EventsError {}

/// Extracts events from widget markup.
///
/// # Errors
///
/// Returns `EventsError::UnrecognizedMarkup` if the markup contains neither
/// the no-events notice nor a list item with an anchor and a span.
#[instrument(skip(html))]
pub fn parse_location_events(location_id: u32, html: &str) -> Result<EventListing, EventsError> {
    if html.contains(NO_EVENTS_SENTINEL) {
        tracing::debug!("No events scheduled");
        return Ok(EventListing::NoEvents);
    }

    let events: Vec<ParsedEvent> = ITEM_RE
        .captures_iter(html)
        .filter_map(|caps| {
            let body = caps.get(1)?.as_str();
            let title = ANCHOR_RE.captures(body)?.get(1)?.as_str();
            let time_range = SPAN_RE.captures_iter(body).last()?.get(1)?.as_str();
            Some(ParsedEvent {
                location_id,
                title: clean_text(title),
                time_range: clean_text(time_range),
            })
        })
        .collect();

    if events.is_empty() {
        return Err(EventsError::UnrecognizedMarkup);
    }

    tracing::debug!(count = events.len(), "Parsed events");
    Ok(EventListing::Events(events))
}

/// How an event's time range places it on the timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSpan {
    /// A same-day clock range.
    Timed(NaiveTime, NaiveTime),
    /// All-day or multi-day; has no slot on the timetable.
    Untimed,
}

/// Classifies a time range.
///
/// `"9:30am - 11:30am Monday, February 5, 2024"` is timed. A date-only range
/// (`"Monday, February 5, 2024"`) or one that spans days
/// (`"9:00am Monday, February 5, 2024 - 5:00pm Tuesday, February 6, 2024"`)
/// is untimed. A space before the meridiem (`"9:30 am"`) is accepted.
///
/// # Errors
///
/// Returns `EventsError::InvalidTimeRange` if a clock token cannot be parsed
/// or a leading clock has no end.
pub fn classify_time_range(range: &str) -> Result<TimeSpan, EventsError> {
    let invalid = || EventsError::InvalidTimeRange(String::from(range));
    let normalized = MERIDIEM_RE.replace_all(range, "${1}${2}");

    let Some((start, rest)) = normalized.split_once(RANGE_SEPARATOR) else {
        return if starts_with_clock(&normalized) {
            Err(invalid())
        } else {
            Ok(TimeSpan::Untimed)
        };
    };

    let start = start.trim();
    if !starts_with_clock(start) || start.split_whitespace().nth(1).is_some() {
        return Ok(TimeSpan::Untimed);
    }

    let end = rest.split_whitespace().next().ok_or_else(invalid)?;
    if !starts_with_clock(end) {
        return Ok(TimeSpan::Untimed);
    }

    let start = parse_clock(start).ok_or_else(invalid)?;
    let end = parse_clock(end).ok_or_else(invalid)?;
    Ok(TimeSpan::Timed(start, end))
}

/// Parses a same-day time range into start and end times.
///
/// Accepts `"H:MMam - H:MMpm <date suffix>"`; minutes may be omitted
/// (`"9am"`).
///
/// # Errors
///
/// Returns `EventsError::InvalidTimeRange` if the range is not a same-day
/// clock range.
pub fn parse_time_range(range: &str) -> Result<(NaiveTime, NaiveTime), EventsError> {
    match classify_time_range(range)? {
        TimeSpan::Timed(start, end) => Ok((start, end)),
        TimeSpan::Untimed => Err(EventsError::InvalidTimeRange(String::from(range))),
    }
}

/// Converts parsed events into timetable events, keeping only timed events
/// inside the 8:00-20:00 window.
///
/// # Errors
///
/// Returns `EventsError::InvalidTimeRange` if any event has a clock that
/// cannot be parsed; no partial list is returned.
#[instrument(skip_all)]
pub fn format_events(events: &[ParsedEvent]) -> Result<Vec<Event>, EventsError> {
    let mut formatted = Vec::with_capacity(events.len());

    for event in events {
        let TimeSpan::Timed(start_time, end_time) = classify_time_range(&event.time_range)? else {
            tracing::debug!(
                title = %event.title,
                range = %event.time_range,
                "Untimed event, skipped"
            );
            continue;
        };

        if !within_display_window(start_time, end_time) {
            tracing::debug!(
                title = %event.title,
                start = %start_time,
                end = %end_time,
                "Event outside display window, skipped"
            );
            continue;
        }

        formatted.push(Event {
            location_id: event.location_id,
            title: event.title.clone(),
            start_time,
            end_time,
            start_row: css_grid_row(start_time),
            end_row: css_grid_row(end_time),
        });
    }

    Ok(formatted)
}

/// Truncates a title to `limit` characters, ending with an ellipsis when cut.
#[must_use]
pub fn truncate_title(title: &str, limit: usize) -> String {
    if title.chars().count() <= limit {
        return String::from(title);
    }
    let mut truncated: String = title.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

/// Parses a 12-hour clock time such as `"9:30am"` or `"12pm"`.
fn parse_clock(s: &str) -> Option<NaiveTime> {
    let upper = s.to_ascii_uppercase();
    let split = upper.len().checked_sub(2)?;
    let (clock, meridiem) = (upper.get(..split)?, upper.get(split..)?);

    let normalized = if clock.contains(':') {
        format!("{clock}{meridiem}")
    } else {
        format!("{clock}:00{meridiem}")
    };
    NaiveTime::parse_from_str(&normalized, "%I:%M%p").ok()
}

/// Returns `true` if the token starts like a clock time (`"9"`, `"12:30pm"`).
fn starts_with_clock(token: &str) -> bool {
    token.trim_start().starts_with(|c: char| c.is_ascii_digit())
}

/// Resolves the named entities seen in widget titles.
fn resolve_entity(entity: &str) -> Option<&'static str> {
    let resolved = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "ndash" => "\u{2013}",
        "mdash" => "\u{2014}",
        "hellip" => "\u{2026}",
        _ => return None,
    };
    Some(resolved)
}

/// Strips tags, decodes entities, and collapses whitespace.
///
/// Text with a malformed or unknown entity is kept as is.
fn clean_text(raw: &str) -> String {
    let stripped = TAG_RE.replace_all(raw, " ");
    let decoded = match unescape_with(&stripped, resolve_entity) {
        Ok(decoded) => decoded,
        Err(e) => {
            tracing::debug!(error = %e, text = %stripped, "Entity decoding failed, kept raw");
            Cow::Borrowed(stripped.as_ref())
        }
    };
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
