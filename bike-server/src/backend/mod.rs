//! Bike-share backend client.
//!
//! This module provides an HTTP client for the journey helper's backend,
//! which serves live station availability, weather and ride predictions.
//!
//! Key characteristics of the backend:
//! - Responses are rows from its cache tables, so most fields are nullable
//! - Some failures come back as HTTP 200 with an `{"error": ...}` body
//! - Timestamps are naive local times in a few different string formats

mod client;
mod convert;
mod error;
mod types;

pub use client::{BackendClient, BackendConfig};
pub use convert::{ConversionError, station_from_record, stations_from_records};
pub use error::BackendError;
pub use types::{
    PositionRecord, RidePrediction, RidePredictionRequest, StationRecord, WeatherRecord,
    parse_backend_timestamp,
};
