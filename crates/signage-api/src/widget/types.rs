//! Hours grid widget response types.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One week of the hours grid, keyed by English weekday name
/// (`"Sunday"` .. `"Saturday"`).
///
/// Key order in the upstream JSON is not significant.
pub type WidgetWeek = BTreeMap<String, WidgetDay>;

/// Full hours grid response.
///
/// The top-level object is keyed by `loc_<id>`; a response normally holds a
/// single location but the widget may return several.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct HoursResponse {
    /// Locations keyed by `loc_<id>`.
    pub locations: BTreeMap<String, WidgetLocation>,
}

impl HoursResponse {
    /// Returns the response key used for a location ID.
    ///
    /// Example: `2609` -> `"loc_2609"`
    #[must_use]
    pub fn location_key(location_id: u32) -> String {
        format!("loc_{location_id}")
    }

    /// Returns the location entry for an ID, if present.
    #[must_use]
    pub fn location(&self, location_id: u32) -> Option<&WidgetLocation> {
        self.locations.get(&Self::location_key(location_id))
    }
}

/// A single location in the hours grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WidgetLocation {
    /// LibCal location ID.
    #[serde(default)]
    pub lid: Option<u32>,
    /// Location name as configured in LibCal.
    #[serde(default)]
    pub name: String,
    /// Location category (e.g. `"library"`, `"department"`).
    #[serde(default)]
    pub category: Option<String>,
    /// Parent location ID for departments.
    #[serde(default)]
    pub parent_lid: Option<u32>,
    /// Weeks of hours, oldest first.
    #[serde(default)]
    pub weeks: Vec<WidgetWeek>,
}

/// A single day in the hours grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WidgetDay {
    /// Calendar date (`YYYY-MM-DD`).
    pub date: String,
    /// Structured opening times.
    #[serde(default)]
    pub times: Option<WidgetTimes>,
    /// Pre-rendered hours string (e.g. `"10am - 4pm"`, `"Closed"`).
    #[serde(default)]
    pub rendered: String,
}

/// Structured opening times for a day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WidgetTimes {
    /// Status (`"open"`, `"closed"`, `"24hours"`, `"text"`, ...).
    #[serde(default)]
    pub status: String,
    /// Opening spans (present when `status` is `"open"`).
    #[serde(default)]
    pub hours: Vec<WidgetTimeSpan>,
    /// Free-text note (present when `status` is `"text"`).
    #[serde(default)]
    pub text: Option<String>,
}

/// One opening span.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WidgetTimeSpan {
    /// Opening time (e.g. `"10am"`).
    pub from: String,
    /// Closing time (e.g. `"4pm"`).
    pub to: String,
}
