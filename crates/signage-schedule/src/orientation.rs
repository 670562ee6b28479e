//! Display orientation and URL construction.

use std::fmt;
use std::str::FromStr;

/// Screen orientation of a sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Landscape (3840x2160).
    Landscape,
    /// Portrait (1080x1920).
    PortraitSmall,
    /// Portrait (2160x3840).
    PortraitLarge,
}

impl Orientation {
    /// All orientations, in menu order.
    pub const ALL: [Self; 3] = [Self::Landscape, Self::PortraitSmall, Self::PortraitLarge];

    /// Returns the URL path segment (e.g. `"portrait_small"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::PortraitSmall => "portrait_small",
            Self::PortraitLarge => "portrait_large",
        }
    }

    /// Returns the human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Landscape => "Landscape (3840x2160)",
            Self::PortraitSmall => "Portrait (1080x1920)",
            Self::PortraitLarge => "Portrait (2160x3840)",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOrientationError(String);

impl fmt::Display for ParseOrientationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown orientation: {} (expected landscape, portrait_small or portrait_large)",
            self.0
        )
    }
}

impl std::error::Error for ParseOrientationError {}

impl FromStr for Orientation {
    type Err = ParseOrientationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| ParseOrientationError(String::from(s)))
    }
}

/// Builds the hours display URL for a sign.
///
/// Example: `http`, `testserver`, `1`, `PortraitSmall` ->
/// `"http://testserver/display_hours/1/portrait_small"`
#[must_use]
pub fn display_url(scheme: &str, host: &str, location_id: u32, orientation: Orientation) -> String {
    format!("{scheme}://{host}/display_hours/{location_id}/{orientation}")
}
