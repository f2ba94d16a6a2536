//! Caching layer for backend responses.
//!
//! Station availability changes minute to minute but the backend itself only
//! refreshes it every five minutes; weather changes more slowly still. The
//! TTLs here mirror the backend's own freshness windows so we never ask for
//! data it cannot have updated yet.
//!
//! Forecasts are bucketed by hour: the backend answers with the nearest
//! three-hourly forecast anyway, so two targets in the same hour share an
//! entry.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::backend::{
    BackendClient, BackendError, RidePrediction, RidePredictionRequest, StationRecord,
    WeatherRecord, stations_from_records,
};
use crate::domain::Station;

/// Cached station list entry.
type StationsEntry = Arc<Vec<StationRecord>>;

/// Cached weather entry.
type WeatherEntry = Arc<WeatherRecord>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the station list.
    pub stations_ttl: Duration,

    /// TTL for current weather.
    pub weather_ttl: Duration,

    /// TTL for forecasts.
    pub forecast_ttl: Duration,

    /// Maximum number of cached forecast hours.
    pub max_forecasts: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stations_ttl: Duration::from_secs(5 * 60),
            weather_ttl: Duration::from_secs(15 * 60),
            forecast_ttl: Duration::from_secs(60 * 60),
            max_forecasts: 256,
        }
    }
}

/// Cache for backend responses.
pub struct BackendCache {
    stations: MokaCache<(), StationsEntry>,
    weather: MokaCache<(), WeatherEntry>,
    /// Forecasts keyed by target time truncated to the hour.
    forecasts: MokaCache<NaiveDateTime, WeatherEntry>,
}

impl BackendCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let stations = MokaCache::builder()
            .time_to_live(config.stations_ttl)
            .max_capacity(1)
            .build();
        let weather = MokaCache::builder()
            .time_to_live(config.weather_ttl)
            .max_capacity(1)
            .build();
        let forecasts = MokaCache::builder()
            .time_to_live(config.forecast_ttl)
            .max_capacity(config.max_forecasts)
            .build();

        Self {
            stations,
            weather,
            forecasts,
        }
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.stations.entry_count() + self.weather.entry_count() + self.forecasts.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.stations.invalidate_all();
        self.weather.invalidate_all();
        self.forecasts.invalidate_all();
    }
}

/// The forecast bucket a target time falls in.
fn forecast_key(target: NaiveDateTime) -> NaiveDateTime {
    target
        .date()
        .and_hms_opt(target.hour(), 0, 0)
        .unwrap_or(target)
}

/// Backend client with caching.
///
/// Wraps a `BackendClient` and caches station and weather responses.
/// Ride predictions always go to the backend.
pub struct CachedBackendClient {
    client: BackendClient,
    cache: BackendCache,
}

impl CachedBackendClient {
    /// Create a new cached client.
    pub fn new(client: BackendClient, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: BackendCache::new(cache_config),
        }
    }

    /// Get the raw station list, using cache if available.
    pub async fn current_bikes(&self) -> Result<StationsEntry, BackendError> {
        if let Some(cached) = self.cache.stations.get(&()).await {
            debug!("station list served from cache");
            return Ok(cached);
        }

        let records = Arc::new(self.client.current_bikes().await?);
        self.cache.stations.insert((), records.clone()).await;

        Ok(records)
    }

    /// Get the validated station list, sorted by name.
    pub async fn stations(&self) -> Result<Vec<Station>, BackendError> {
        let records = self.current_bikes().await?;
        Ok(stations_from_records(&records))
    }

    /// Fetch the station list from the backend, bypassing the cache.
    ///
    /// On success the cached list is replaced; on failure it is left alone.
    pub async fn refresh_stations(&self) -> Result<Vec<Station>, BackendError> {
        let records = Arc::new(self.client.current_bikes().await?);
        self.cache.stations.insert((), records.clone()).await;
        Ok(stations_from_records(&records))
    }

    /// Get the current weather, using cache if available.
    pub async fn current_weather(&self) -> Result<WeatherEntry, BackendError> {
        if let Some(cached) = self.cache.weather.get(&()).await {
            debug!("current weather served from cache");
            return Ok(cached);
        }

        let weather = Arc::new(self.client.current_weather().await?);
        self.cache.weather.insert((), weather.clone()).await;

        Ok(weather)
    }

    /// Get the forecast for `target`, using cache if available.
    pub async fn forecast_weather(
        &self,
        target: NaiveDateTime,
    ) -> Result<WeatherEntry, BackendError> {
        let key = forecast_key(target);

        if let Some(cached) = self.cache.forecasts.get(&key).await {
            debug!(%key, "forecast served from cache");
            return Ok(cached);
        }

        let weather = Arc::new(self.client.forecast_weather(target).await?);
        self.cache.forecasts.insert(key, weather.clone()).await;

        Ok(weather)
    }

    /// Ask for a ride prediction. Never cached.
    pub async fn ride_prediction(
        &self,
        payload: &RidePredictionRequest,
    ) -> Result<RidePrediction, BackendError> {
        self.client.ride_prediction(payload).await
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_cache(&self) {
        self.cache.invalidate_all();
    }

    #[cfg(test)]
    pub(crate) async fn prime_stations(&self, records: Vec<StationRecord>) {
        self.cache.stations.insert((), Arc::new(records)).await;
    }
}
