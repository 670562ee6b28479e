//! `WidgetApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::HoursResponse;

/// LibCal widget API trait.
///
/// Abstracts the two widget fetches so the normalization pipeline can be
/// driven by a mock in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(WidgetApi: Send)]
pub trait LocalWidgetApi {
    /// Fetches the hours grid for a location, `weeks` weeks ahead.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, times out, returns a
    /// non-success status, or the body is not valid hours JSON.
    async fn fetch_hours(&self, location_id: u32, weeks: u32) -> Result<HoursResponse>;

    /// Fetches the raw events list markup for a location.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, times out, or returns a
    /// non-success status.
    async fn fetch_events(&self, location_id: u32) -> Result<String>;
}
