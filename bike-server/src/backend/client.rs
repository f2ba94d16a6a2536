//! Bike-share backend HTTP client.
//!
//! Provides async methods for the station, weather and ride-prediction
//! endpoints. Limits concurrent requests with a semaphore.

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use super::error::BackendError;
use super::types::{
    RidePrediction, RidePredictionRequest, RidePredictionResponse, StationRecord, WeatherRecord,
};

/// Default base URL: the Flask development server.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Forecast granularity requested from the backend.
const FORECAST_TYPE: &str = "hourly";

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl BackendConfig {
    /// Create a config pointing at the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }
}

/// Client for the bike-share backend API.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl BackendClient {
    /// Create a new backend client with the given configuration.
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(BackendError::InvalidRequest(format!(
                "base URL must start with http:// or https://, got {:?}",
                config.base_url
            )));
        }
        if config.max_concurrent == 0 {
            return Err(BackendError::InvalidRequest(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the live station list (`GET /api/current_bikes`).
    pub async fn current_bikes(&self) -> Result<Vec<StationRecord>, BackendError> {
        let request = self.http.get(self.url("/api/current_bikes"));
        self.send(request).await
    }

    /// Fetch the current weather (`GET /api/current_weather`).
    pub async fn current_weather(&self) -> Result<WeatherRecord, BackendError> {
        let request = self.http.get(self.url("/api/current_weather"));
        self.send(request).await
    }

    /// Fetch the hourly forecast closest to `target` (`GET /api/forecast_weather`).
    pub async fn forecast_weather(
        &self,
        target: NaiveDateTime,
    ) -> Result<WeatherRecord, BackendError> {
        let request = self.http.get(self.url("/api/forecast_weather")).query(&[
            ("forecast_type", FORECAST_TYPE.to_string()),
            ("target_datetime", format_target_datetime(target)),
        ]);
        self.send(request).await
    }

    /// Ask for predicted availability (`POST /api/ride_prediction`).
    pub async fn ride_prediction(
        &self,
        payload: &RidePredictionRequest,
    ) -> Result<RidePrediction, BackendError> {
        let request = self.http.post(self.url("/api/ride_prediction")).json(payload);
        let response: RidePredictionResponse = self.send(request).await?;
        Ok(response.into())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the body, mapping backend failures.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, BackendError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BackendError::InvalidRequest("client is shut down".to_string()))?;

        let response = request.send().await?;
        let status = response.status();
        debug!(url = %response.url(), %status, "backend response");

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(BackendError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(BackendError::RateLimited);
        }

        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        decode_body(status.as_u16(), &body)
    }
}

/// Decode a successful response body.
///
/// The backend reports some failures as a 200 with `{"error": "..."}`, so
/// the body is checked for that shape before decoding into `T`.
fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, BackendError> {
    let json_error = |e: serde_json::Error| BackendError::Json {
        message: e.to_string(),
        body: Some(body.chars().take(500).collect()),
    };

    let value: Value = serde_json::from_str(body).map_err(json_error)?;
    if let Some(message) = error_field(&value) {
        return Err(BackendError::Api { status, message });
    }

    serde_json::from_value(value).map_err(json_error)
}

/// The `error` string of an `{"error": ...}` object, if that is what `value` is.
fn error_field(value: &Value) -> Option<String> {
    value.get("error")?.as_str().map(str::to_string)
}

/// Pull the message out of an error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(error_field)
        .unwrap_or_else(|| body.chars().take(500).collect())
}

/// ISO-8601 local datetime as the forecast endpoint expects it.
fn format_target_datetime(target: NaiveDateTime) -> String {
    target.format("%Y-%m-%dT%H:%M:%S").to_string()
}
