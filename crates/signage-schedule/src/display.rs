//! Display view models assembled from widget data.
//!
//! Every failure while loading a location (upstream unreachable, location
//! missing from the response, malformed data) ends in the same user-facing
//! message; the detail goes to the log.

use anyhow::{Context, Result};
use signage_api::widget::LocalWidgetApi;
use tracing::instrument;

use crate::events::{Event, format_events, parse_location_events};
use crate::hours::{HOURS_WEEKS, WeeklyHours, normalize_hours, select_location};
use crate::location::Location;

/// Message shown on a sign when hours cannot be loaded.
pub const HOURS_ERROR_MESSAGE: &str = "Error retrieving hours.";

/// Message shown on a sign when events cannot be loaded.
pub const EVENTS_ERROR_MESSAGE: &str = "Error retrieving events.";

/// What an hours sign shows for a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoursDisplay {
    /// A full Monday-to-Sunday week.
    Ready {
        /// Location shown.
        location: Location,
        /// First date of the week (e.g. `"Feb 05"`).
        start: String,
        /// Last date of the week (e.g. `"Feb 11"`).
        end: String,
        /// The week's hours.
        hours: WeeklyHours,
    },
    /// Hours could not be loaded.
    Unavailable {
        /// Location shown.
        location: Location,
        /// Diagnostic detail (not shown on the sign).
        reason: String,
    },
}

impl HoursDisplay {
    /// Builds the display from a hours lookup result, logging failures.
    #[must_use]
    pub fn from_result(location: Location, result: Result<WeeklyHours>) -> Self {
        match result {
            Ok(hours) => {
                let (start, end) = hours.date_range();
                Self::Ready {
                    location,
                    start,
                    end,
                    hours,
                }
            }
            Err(e) => {
                let reason = format!("{e:#}");
                tracing::warn!(
                    location_id = location.location_id,
                    error = %reason,
                    "Hours unavailable"
                );
                Self::Unavailable { location, reason }
            }
        }
    }

    /// Returns the location shown.
    #[must_use]
    pub const fn location(&self) -> &Location {
        match self {
            Self::Ready { location, .. } | Self::Unavailable { location, .. } => location,
        }
    }

    /// Returns the user-facing error message, if hours are unavailable.
    #[must_use]
    pub const fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Ready { .. } => None,
            Self::Unavailable { .. } => Some(HOURS_ERROR_MESSAGE),
        }
    }
}

/// Events loaded for one location.
#[derive(Debug)]
pub struct LocationEvents {
    /// Location the events belong to.
    pub location: Location,
    /// Events inside the display window, or why they could not be loaded.
    pub outcome: Result<Vec<Event>>,
}

impl LocationEvents {
    /// Returns the loaded events (empty when unavailable).
    #[must_use]
    pub fn events(&self) -> &[Event] {
        self.outcome.as_deref().unwrap_or_default()
    }

    /// Returns the user-facing error message, if events are unavailable.
    #[must_use]
    pub const fn error_message(&self) -> Option<&'static str> {
        match self.outcome {
            Ok(_) => None,
            Err(_) => Some(EVENTS_ERROR_MESSAGE),
        }
    }
}

/// Fetches and normalizes one week of hours for a location.
///
/// # Errors
///
/// Returns an error if the fetch fails, the location is absent from the
/// response, or the response is malformed.
#[instrument(skip(api))]
pub async fn fetch_weekly_hours(
    api: &(impl LocalWidgetApi + Sync),
    location_id: u32,
) -> Result<WeeklyHours> {
    let response = api
        .fetch_hours(location_id, HOURS_WEEKS)
        .await
        .context("failed to fetch hours")?;

    let selected =
        select_location(response, location_id).context("location missing from hours response")?;

    normalize_hours(&selected).context("malformed hours response")
}

/// Loads the hours display for a location.
#[instrument(skip_all, fields(location_id = location.location_id))]
pub async fn load_hours_display(
    api: &(impl LocalWidgetApi + Sync),
    location: &Location,
) -> HoursDisplay {
    let result = fetch_weekly_hours(api, location.location_id).await;
    HoursDisplay::from_result(location.clone(), result)
}

/// Fetches, parses, and formats events for a location.
///
/// A `No events are scheduled.` response yields an empty list.
///
/// # Errors
///
/// Returns an error if the fetch fails or the markup cannot be parsed.
#[instrument(skip(api))]
pub async fn fetch_location_events(
    api: &(impl LocalWidgetApi + Sync),
    location_id: u32,
) -> Result<Vec<Event>> {
    let html = api
        .fetch_events(location_id)
        .await
        .context("failed to fetch events")?;

    let listing =
        parse_location_events(location_id, &html).context("malformed events response")?;

    format_events(&listing.into_events()).context("malformed events response")
}

/// Loads events for several locations, one request at a time.
///
/// A failure for one location does not affect the others.
#[instrument(skip_all, fields(locations = locations.len()))]
pub async fn collect_events(
    api: &(impl LocalWidgetApi + Sync),
    locations: &[Location],
) -> Vec<LocationEvents> {
    let mut results = Vec::with_capacity(locations.len());

    for location in locations {
        let outcome = fetch_location_events(api, location.location_id).await;

        match &outcome {
            Ok(events) => tracing::debug!(
                location_id = location.location_id,
                count = events.len(),
                "Events loaded"
            ),
            Err(e) => tracing::warn!(
                location_id = location.location_id,
                error = %format!("{e:#}"),
                "Events unavailable"
            ),
        }

        results.push(LocationEvents {
            location: location.clone(),
            outcome,
        });
    }

    results
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{Result, bail};
    use signage_api::widget::HoursResponse;
    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;

    const HOURS_TWO_WEEKS: &str = include_str!("../../../fixtures/libcal/hours_two_weeks.json");
    const HOURS_ONE_WEEK: &str = include_str!("../../../fixtures/libcal/hours_one_week.json");
    const HOURS_MULTIPLE: &str =
        include_str!("../../../fixtures/libcal/hours_multiple_locations.json");
    const EVENTS_3363: &str = include_str!("../../../fixtures/libcal/events_3363.html");
    const EVENTS_10430: &str = include_str!("../../../fixtures/libcal/events_10430.html");

    /// Mock API serving canned bodies and recording request order.
    #[derive(Default)]
    struct MockWidgetApi {
        hours: Option<&'static str>,
        events: HashMap<u32, &'static str>,
        requests: Mutex<Vec<u32>>,
    }

    impl MockWidgetApi {
        fn with_hours(json: &'static str) -> Self {
            Self {
                hours: Some(json),
                ..Self::default()
            }
        }

        fn with_events(events: &[(u32, &'static str)]) -> Self {
            Self {
                events: events.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn requests(&self) -> Vec<u32> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl LocalWidgetApi for MockWidgetApi {
        async fn fetch_hours(&self, location_id: u32, _weeks: u32) -> Result<HoursResponse> {
            self.requests.lock().unwrap().push(location_id);
            let Some(json) = self.hours else {
                bail!("HoursGrid request failed");
            };
            Ok(serde_json::from_str(json)?)
        }

        async fn fetch_events(&self, location_id: u32) -> Result<String> {
            self.requests.lock().unwrap().push(location_id);
            match self.events.get(&location_id) {
                Some(html) => Ok(String::from(*html)),
                None => bail!("EventsList request failed (HTTP 404 Not Found)"),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_weekly_hours() {
        // Arrange
        let api = MockWidgetApi::with_hours(HOURS_TWO_WEEKS);

        // Act
        let week = fetch_weekly_hours(&api, 20525).await.unwrap();

        // Assert
        assert_eq!(week.first().iso_date(), "2024-02-05");
        assert_eq!(week.last().iso_date(), "2024-02-11");
        assert_eq!(api.requests(), [20525]);
    }

    #[tokio::test]
    async fn test_fetch_weekly_hours_selects_from_multiple_locations() {
        // Arrange
        let api = MockWidgetApi::with_hours(HOURS_MULTIPLE);

        // Act
        let week = fetch_weekly_hours(&api, 4690).await.unwrap();

        // Assert
        assert_eq!(week.first().rendered_hours, "9am - 5pm");
    }

    #[tokio::test]
    async fn test_fetch_weekly_hours_location_missing() {
        // Arrange
        let api = MockWidgetApi::with_hours(HOURS_TWO_WEEKS);

        // Act
        let err = fetch_weekly_hours(&api, 11_111_111).await.unwrap_err();

        // Assert
        assert_eq!(err.to_string(), "location missing from hours response");
        assert!(format!("{err:#}").contains("loc_11111111"));
    }

    #[tokio::test]
    async fn test_load_hours_display_ready() {
        // Arrange
        let api = MockWidgetApi::with_hours(HOURS_TWO_WEEKS);
        let location = Location::new("Arts Library Reference Desk", 20525);

        // Act
        let display = load_hours_display(&api, &location).await;

        // Assert
        let HoursDisplay::Ready { start, end, hours, .. } = &display else {
            panic!("expected Ready, got {display:?}");
        };
        assert_eq!(start, "Feb 05");
        assert_eq!(end, "Feb 11");
        assert_eq!(hours.days().len(), 7);
        assert_eq!(display.error_message(), None);
        assert_eq!(display.location(), &location);
    }

    #[tokio::test]
    async fn test_load_hours_display_error_classes_share_message() {
        // Arrange: malformed shape, missing location, network failure
        let location = Location::new("Arts Library Reference Desk", 20525);
        let malformed = MockWidgetApi::with_hours(HOURS_ONE_WEEK);
        let missing = MockWidgetApi::with_hours(HOURS_TWO_WEEKS);
        let unreachable = MockWidgetApi::default();

        // Act
        let displays = [
            load_hours_display(&malformed, &location).await,
            load_hours_display(&missing, &Location::new("Elsewhere", 1)).await,
            load_hours_display(&unreachable, &location).await,
        ];

        // Assert
        for display in &displays {
            assert_eq!(display.error_message(), Some(HOURS_ERROR_MESSAGE));
        }
        let HoursDisplay::Unavailable { reason, .. } = &displays[0] else {
            panic!("expected Unavailable");
        };
        assert!(reason.contains("expected 2 weeks, found 1"));
        let HoursDisplay::Unavailable { reason, .. } = &displays[2] else {
            panic!("expected Unavailable");
        };
        assert!(reason.contains("failed to fetch hours"));
    }

    #[test]
    fn test_hours_display_from_error_logs_warning() {
        // Arrange
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().at_level(tracing::Level::WARN))
            .only()
            .run_with_handle();
        let location = Location::new("Powell Library", 2609);

        // Act
        let display = with_default(subscriber, || {
            HoursDisplay::from_result(location, Err(anyhow::anyhow!("HoursGrid request failed")))
        });

        // Assert
        handle.assert_finished();
        assert_eq!(display.error_message(), Some(HOURS_ERROR_MESSAGE));
    }

    #[test]
    fn test_hours_display_from_ok_logs_nothing() {
        // Arrange
        let (subscriber, handle) = subscriber::mock().only().run_with_handle();
        let response: HoursResponse = serde_json::from_str(HOURS_TWO_WEEKS).unwrap();
        let week = normalize_hours(&response).unwrap();
        let location = Location::new("Arts Library Reference Desk", 20525);

        // Act
        let display = with_default(subscriber, || HoursDisplay::from_result(location, Ok(week)));

        // Assert
        handle.assert_finished();
        assert!(display.error_message().is_none());
    }

    #[tokio::test]
    async fn test_fetch_location_events() {
        // Arrange
        let api = MockWidgetApi::with_events(&[(3363, EVENTS_3363)]);

        // Act
        let events = fetch_location_events(&api, 3363).await.unwrap();

        // Assert
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].title, "Philosophy 31");
        assert!(events.iter().all(|e| e.location_id == 3363));
    }

    #[tokio::test]
    async fn test_fetch_location_events_none_scheduled() {
        // Arrange
        let api = MockWidgetApi::with_events(&[(10430, EVENTS_10430)]);

        // Act & Assert
        assert!(fetch_location_events(&api, 10430).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_location_events_unrecognized_markup() {
        // Arrange
        let api = MockWidgetApi::with_events(&[(1, "<p>Maintenance</p>")]);

        // Act
        let err = fetch_location_events(&api, 1).await.unwrap_err();

        // Assert
        assert!(format!("{err:#}").contains("unrecognized events markup"));
    }

    #[tokio::test]
    async fn test_collect_events_sequential_and_isolated() {
        // Arrange: 4357 is not served and fails
        let api = MockWidgetApi::with_events(&[(3363, EVENTS_3363), (10430, EVENTS_10430)]);
        let locations = [
            Location::new("Classroom A", 3363),
            Location::new("Classroom B", 4357),
            Location::new("Inquiry Lab", 10430),
        ];

        // Act
        let results = collect_events(&api, &locations).await;

        // Assert
        assert_eq!(api.requests(), [3363, 4357, 10430]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].events().len(), 3);
        assert_eq!(results[0].error_message(), None);
        assert!(results[1].events().is_empty());
        assert_eq!(results[1].error_message(), Some(EVENTS_ERROR_MESSAGE));
        assert!(results[2].events().is_empty());
        assert_eq!(results[2].error_message(), None);
        assert_eq!(results[2].location.name, "Inquiry Lab");
    }
}
