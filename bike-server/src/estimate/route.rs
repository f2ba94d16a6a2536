//! Route estimates between two points.

use chrono::{DateTime, TimeZone};

use crate::domain::{EstimateError, GeoPoint, Station};

use super::arrival::{estimate_arrival, format_clock};
use super::config::EstimatorConfig;
use super::distance::great_circle_distance_km;
use super::duration::{cycling_minutes, format_duration};

/// Distance, cycling time and arrival for one ride.
///
/// Created fresh for every request and owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteEstimate<Tz: TimeZone> {
    pub distance_km: f64,
    pub cycling_minutes: f64,
    pub departure: DateTime<Tz>,
    pub arrival: DateTime<Tz>,
}

impl<Tz: TimeZone> RouteEstimate<Tz>
where
    Tz::Offset: std::fmt::Display,
{
    /// e.g. "0.79 km"
    pub fn distance_label(&self) -> String {
        format!("{:.2} km", self.distance_km)
    }

    /// e.g. "1 hr 5 min"
    pub fn duration_label(&self) -> String {
        // cycling_minutes is validated on construction
        format_duration(self.cycling_minutes).unwrap_or_default()
    }

    /// Arrival as a 24-hour `HH:MM` reading.
    pub fn arrival_label(&self) -> String {
        format_clock(&self.arrival)
    }
}

/// Turns two points and a departure time into a [`RouteEstimate`].
///
/// Stateless apart from its configuration: identical inputs always give
/// identical outputs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteEstimator {
    config: EstimatorConfig,
}

impl RouteEstimator {
    /// Create an estimator with the given configuration.
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// The estimator's configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Estimate a ride from `origin` to `destination` leaving at `departure`.
    pub fn estimate<Tz: TimeZone>(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        departure: DateTime<Tz>,
    ) -> Result<RouteEstimate<Tz>, EstimateError> {
        let distance_km = great_circle_distance_km(origin, destination);
        let minutes = cycling_minutes(distance_km, self.config.average_speed_kmh())?;
        let arrival = estimate_arrival(departure.clone(), minutes)?;

        Ok(RouteEstimate {
            distance_km,
            cycling_minutes: minutes,
            departure,
            arrival,
        })
    }

    /// Estimate a ride between two stations.
    pub fn estimate_between<Tz: TimeZone>(
        &self,
        origin: &Station,
        destination: &Station,
        departure: DateTime<Tz>,
    ) -> Result<RouteEstimate<Tz>, EstimateError> {
        self.estimate(origin.position, destination.position, departure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    fn departure() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 8, 0, 0).unwrap()
    }

    #[test]
    fn city_centre_ride() {
        let estimator = RouteEstimator::default();
        let estimate = estimator
            .estimate(point(53.3498, -6.2603), point(53.3441, -6.2675), departure())
            .unwrap();

        assert!((estimate.distance_km - 0.793_812).abs() < 1e-6);
        assert!((estimate.cycling_minutes - 3.969_061).abs() < 1e-6);
        assert_eq!(estimate.distance_label(), "0.79 km");
        assert_eq!(estimate.duration_label(), "4 min");
        assert_eq!(estimate.arrival_label(), "08:03");
        assert_eq!(estimate.departure, departure());
    }

    #[test]
    fn same_point_arrives_immediately() {
        let estimator = RouteEstimator::default();
        let p = point(53.3498, -6.2603);
        let estimate = estimator.estimate(p, p, departure()).unwrap();

        assert_eq!(estimate.distance_km, 0.0);
        assert_eq!(estimate.cycling_minutes, 0.0);
        assert_eq!(estimate.arrival, departure());
    }

    #[test]
    fn faster_rider_arrives_sooner() {
        let slow = RouteEstimator::default();
        let fast = RouteEstimator::new(EstimatorConfig::new(24.0).unwrap());
        let (a, b) = (point(53.3498, -6.2603), point(53.3303, -6.2512));

        let slow = slow.estimate(a, b, departure()).unwrap();
        let fast = fast.estimate(a, b, departure()).unwrap();

        assert_eq!(slow.distance_km, fast.distance_km);
        assert!((slow.cycling_minutes - 2.0 * fast.cycling_minutes).abs() < 1e-9);
        assert!(fast.arrival < slow.arrival);
    }

    #[test]
    fn idempotent() {
        let estimator = RouteEstimator::default();
        let (a, b) = (point(53.3498, -6.2603), point(53.3441, -6.2675));
        let first = estimator.estimate(a, b, departure()).unwrap();
        let second = estimator.estimate(a, b, departure()).unwrap();
        assert_eq!(first, second);
    }
}
