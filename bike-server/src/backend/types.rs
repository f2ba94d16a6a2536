//! Wire types for the bike-share backend API.
//!
//! The backend serves rows straight out of its cache tables, so most fields
//! may be `null`. Conversion into validated domain types happens in
//! `convert`.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::StationId;

/// A station row from `GET /api/current_bikes`.
///
/// Also accepts the raw JCDecaux shape, which calls the id `number`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StationRecord {
    #[serde(alias = "number")]
    pub station_id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub position: Option<PositionRecord>,
    #[serde(default)]
    pub available_bikes: Option<u32>,
    #[serde(default)]
    pub available_bike_stands: Option<u32>,
    #[serde(default)]
    pub bike_stands: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Station coordinates as sent by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PositionRecord {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

/// A weather row from `/api/current_weather` or `/api/forecast_weather`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct WeatherRecord {
    /// When the observation/forecast applies.
    #[serde(default)]
    pub timestamp_weatherinfo: Option<String>,
    /// "current", "hourly" or "daily".
    #[serde(default)]
    pub forecast_type: Option<String>,
    /// Temperature in °C.
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    /// Relative humidity in percent.
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub wind_gust: Option<f64>,
    #[serde(default)]
    pub rain_1h: Option<f64>,
    #[serde(default)]
    pub snow_1h: Option<f64>,
    /// OpenWeather icon code, e.g. "10d".
    #[serde(default)]
    pub weather_id: Option<String>,
}

impl WeatherRecord {
    /// The instant the weather applies to, if the backend sent a parseable one.
    pub fn observed_at(&self) -> Option<NaiveDateTime> {
        self.timestamp_weatherinfo
            .as_deref()
            .and_then(parse_backend_timestamp)
    }

    /// Path of the icon for this weather on the front-end's static server.
    pub fn icon_path(&self) -> Option<String> {
        self.weather_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .map(|id| format!("/static/pics/weather_icons/{id}.png"))
    }
}

/// Body of `POST /api/ride_prediction`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RidePredictionRequest {
    /// Departure time as `YYYY-MM-DD HH:MM`.
    pub timestamp: String,
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    pub origin_station_id: StationId,
    pub destination_station_id: StationId,
}

/// Response of `POST /api/ride_prediction`.
#[derive(Debug, Clone, Deserialize)]
pub struct RidePredictionResponse {
    pub prediction: PredictionCounts,
}

/// The backend keys its predictions by the request field they answer.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionCounts {
    /// Predicted available bikes at the origin.
    pub origin_station_id: u32,
    /// Predicted available stands at the destination.
    pub destination_station_id: u32,
}

/// Predicted availability for a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RidePrediction {
    pub bikes_at_origin: u32,
    pub stands_at_destination: u32,
}

impl From<RidePredictionResponse> for RidePrediction {
    fn from(response: RidePredictionResponse) -> Self {
        Self {
            bikes_at_origin: response.prediction.origin_station_id,
            stands_at_destination: response.prediction.destination_station_id,
        }
    }
}

/// Parse a timestamp in any of the forms the backend emits.
///
/// Flask serialises datetimes as RFC 2822 (`Wed, 02 Apr 2025 14:30:00 GMT`),
/// rows read back from SQLite come as `2025-04-02 14:30:00[.ffffff]`, and
/// ISO 8601 with a `T` separator also appears. The wall-clock reading is
/// kept as-is; no time zone conversion is applied.
///
/// # Examples
///
/// ```
/// use bike_server::backend::parse_backend_timestamp;
///
/// let a = parse_backend_timestamp("Wed, 02 Apr 2025 14:30:00 GMT").unwrap();
/// let b = parse_backend_timestamp("2025-04-02 14:30:00").unwrap();
/// assert_eq!(a, b);
/// assert!(parse_backend_timestamp("yesterday").is_none());
/// ```
pub fn parse_backend_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
