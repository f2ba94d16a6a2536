//! Bike station types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GeoPoint;

/// A Dublin Bikes station number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(pub u32);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a station is currently accepting rentals and returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StationStatus {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl StationStatus {
    /// Parse the backend's status string ("OPEN" / "CLOSED").
    ///
    /// Matching is case-insensitive; anything else is `Unknown`.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("open") {
            StationStatus::Open
        } else if s.eq_ignore_ascii_case("closed") {
            StationStatus::Closed
        } else {
            StationStatus::Unknown
        }
    }
}

/// A bike-docking location with live availability counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub address: String,
    pub position: GeoPoint,
    pub available_bikes: u32,
    pub available_stands: u32,
    /// Total docking points at the station.
    pub bike_stands: u32,
    pub status: StationStatus,
}

impl Station {
    /// Whether a bike can be rented here right now.
    pub fn has_bikes(&self) -> bool {
        self.status != StationStatus::Closed && self.available_bikes > 0
    }

    /// Whether a bike can be returned here right now.
    pub fn has_stands(&self) -> bool {
        self.status != StationStatus::Closed && self.available_stands > 0
    }
}
