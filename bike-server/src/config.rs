//! Application configuration from environment variables.

use std::path::PathBuf;

use tracing::info;

use crate::domain::StationId;
use crate::estimate::{DEFAULT_AVERAGE_SPEED_KMH, EstimatorConfig};

/// Dame Street, the fallback home station.
pub const DEFAULT_HOME_STATION: StationId = StationId(10);

const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_SNAPSHOT_PATH: &str = "stations_snapshot.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Environment variables read by [`AppConfig::from_env`].
pub const VARIABLES: [&str; 5] = [
    "BIKES_API_URL",
    "HOME_STATION_ID",
    "AVERAGE_SPEED_KMH",
    "STATION_SNAPSHOT_PATH",
    "BACKEND_TIMEOUT_SECS",
];

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is not valid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration for the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub home_station: StationId,
    pub estimator: EstimatorConfig,
    pub snapshot_path: PathBuf,
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = get("BIKES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let home_station = match get("HOME_STATION_ID") {
            Some(v) => StationId(parse("HOME_STATION_ID", &v)?),
            None => DEFAULT_HOME_STATION,
        };

        let speed = match get("AVERAGE_SPEED_KMH") {
            Some(v) => parse("AVERAGE_SPEED_KMH", &v)?,
            None => DEFAULT_AVERAGE_SPEED_KMH,
        };
        let estimator = EstimatorConfig::new(speed).map_err(|e| ConfigError::Invalid {
            name: "AVERAGE_SPEED_KMH",
            value: speed.to_string(),
            reason: e.to_string(),
        })?;

        let snapshot_path = get("STATION_SNAPSHOT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_PATH));

        let timeout_secs = match get("BACKEND_TIMEOUT_SECS") {
            Some(v) => parse("BACKEND_TIMEOUT_SECS", &v)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            home_station,
            estimator,
            snapshot_path,
            timeout_secs,
        })
    }

    /// Log the effective configuration.
    pub fn log(&self) {
        info!(
            api_url = %self.api_url,
            home_station = %self.home_station,
            average_speed_kmh = self.estimator.average_speed_kmh(),
            snapshot = %self.snapshot_path.display(),
            timeout_secs = self.timeout_secs,
            "configuration loaded"
        );
    }
}

fn parse<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}
