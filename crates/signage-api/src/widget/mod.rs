//! LibCal widget client module.
//!
//! Handles HTTP requests to the hours grid widget (JSON) and the
//! events list widget (HTML fragment).

mod api;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalWidgetApi, WidgetApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{
    DEFAULT_EVENTS_URL, DEFAULT_HOURS_URL, DEFAULT_TIMEOUT, WidgetClient, WidgetClientBuilder,
};
#[allow(clippy::module_name_repetitions)]
pub use types::{HoursResponse, WidgetDay, WidgetLocation, WidgetTimeSpan, WidgetTimes, WidgetWeek};
