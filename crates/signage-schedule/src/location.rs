//! Location lookup.

use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::Deserialize;

/// A physical site or room shown on a sign.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Location {
    /// Name displayed on the sign.
    pub name: String,
    /// LibCal location ID.
    pub location_id: u32,
}

impl Location {
    /// Creates a new `Location`.
    #[must_use]
    pub fn new(name: impl Into<String>, location_id: u32) -> Self {
        Self {
            name: name.into(),
            location_id,
        }
    }

    /// Placeholder for an ID with no configured name.
    #[must_use]
    pub fn unnamed(location_id: u32) -> Self {
        Self::new(format!("Location {location_id}"), location_id)
    }
}

/// Read-only map from location ID to `Location`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDirectory {
    by_id: BTreeMap<u32, Location>,
}

impl LocationDirectory {
    /// Builds a directory from a list of locations.
    ///
    /// # Errors
    ///
    /// Returns an error if two locations share a `location_id`.
    pub fn new(locations: impl IntoIterator<Item = Location>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for location in locations {
            let id = location.location_id;
            if let Some(existing) = by_id.insert(id, location) {
                bail!(
                    "duplicate location_id {id} (already used by \"{}\")",
                    existing.name
                );
            }
        }
        Ok(Self { by_id })
    }

    /// Returns the location for an ID.
    #[must_use]
    pub fn get(&self, location_id: u32) -> Option<&Location> {
        self.by_id.get(&location_id)
    }

    /// Returns the display name for an ID.
    #[must_use]
    pub fn name_of(&self, location_id: u32) -> Option<&str> {
        self.get(location_id).map(|l| l.name.as_str())
    }

    /// Returns the location for an ID, or an unnamed placeholder.
    #[must_use]
    pub fn resolve(&self, location_id: u32) -> Location {
        self.get(location_id)
            .cloned()
            .unwrap_or_else(|| Location::unnamed(location_id))
    }

    /// Returns all locations ordered by name.
    #[must_use]
    pub fn sorted_by_name(&self) -> Vec<&Location> {
        let mut locations: Vec<&Location> = self.by_id.values().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name).then(a.location_id.cmp(&b.location_id)));
        locations
    }

    /// Number of locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no locations are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
