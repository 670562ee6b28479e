//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use signage_api::widget::{DEFAULT_EVENTS_URL, DEFAULT_HOURS_URL, DEFAULT_TIMEOUT};
use signage_schedule::{Location, LocationDirectory};
use url::Url;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// LibCal widget endpoints.
    #[serde(default)]
    pub widget: WidgetConfig,
    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Events display settings.
    #[serde(default)]
    pub events: EventsConfig,
    /// Known locations (ID to display name).
    #[serde(default)]
    pub locations: Vec<Location>,
}

/// LibCal widget endpoint configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WidgetConfig {
    /// Hours grid endpoint.
    pub hours_url: String,
    /// Events list base URL (location ID is appended).
    pub events_url: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            hours_url: String::from(DEFAULT_HOURS_URL),
            events_url: String::from(DEFAULT_EVENTS_URL),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. Must be greater than zero.
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Events display configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct EventsConfig {
    /// Location IDs shown when `--location` is omitted.
    #[serde(default)]
    pub locations: Vec<u32>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parses the configured hours endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if `widget.hours_url` is not a valid URL.
    pub fn hours_url(&self) -> Result<Url> {
        Url::parse(&self.widget.hours_url)
            .with_context(|| format!("invalid widget.hours_url: {}", self.widget.hours_url))
    }

    /// Parses the configured events base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if `widget.events_url` is not a valid URL.
    pub fn events_url(&self) -> Result<Url> {
        Url::parse(&self.widget.events_url)
            .with_context(|| format!("invalid widget.events_url: {}", self.widget.events_url))
    }

    /// Returns the per-request HTTP timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    /// Builds the location directory.
    ///
    /// # Errors
    ///
    /// Returns an error if two configured locations share an ID.
    pub fn directory(&self) -> Result<LocationDirectory> {
        LocationDirectory::new(self.locations.iter().cloned()).context("invalid [[locations]]")
    }
}
