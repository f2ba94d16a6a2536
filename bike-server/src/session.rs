//! Ride session state.
//!
//! A `RideSession` holds everything the journey helper needs between user
//! actions: the home station rides start from, the currently selected
//! destination and whether the user is riding now or planning ahead. All
//! of it is owned here and passed explicitly; nothing is global.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::backend::{RidePredictionRequest, WeatherRecord};
use crate::domain::{EstimateError, Station, StationId};
use crate::estimate::{RouteEstimate, RouteEstimator};

/// Departure time used for a forecast when the user picks only a date.
const DEFAULT_FORECAST_TIME: (u32, u32) = (12, 0);

/// Whether the user rides now or plans a ride for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RideMode {
    #[default]
    Now,
    Forecast {
        date: NaiveDate,
        time: Option<NaiveTime>,
    },
}

impl RideMode {
    /// The planned departure as a wall-clock reading, in forecast mode.
    ///
    /// A forecast without a time departs at noon.
    pub fn forecast_departure(&self) -> Option<NaiveDateTime> {
        match self {
            RideMode::Now => None,
            RideMode::Forecast { date, time } => {
                let (h, m) = DEFAULT_FORECAST_TIME;
                let time = time.or_else(|| NaiveTime::from_hms_opt(h, m, 0))?;
                Some(date.and_time(time))
            }
        }
    }
}

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("station {0} is the home station")]
    SameStation(StationId),

    #[error("no destination selected")]
    NothingSelected,

    #[error("{0} does not exist in the local time zone")]
    NonexistentLocalTime(NaiveDateTime),

    #[error("weather data has no {0}")]
    MissingWeather(&'static str),

    #[error(transparent)]
    Estimate(#[from] EstimateError),
}

/// A selected destination and the estimate for riding there.
#[derive(Debug, Clone)]
pub struct Selection<Tz: TimeZone> {
    pub destination: Station,
    pub estimate: RouteEstimate<Tz>,
}

impl<Tz: TimeZone> Selection<Tz>
where
    Tz::Offset: fmt::Display,
{
    /// The four sidebar lines describing this ride.
    pub fn summary_lines(&self) -> [String; 4] {
        [
            format!("Destination: {}", self.destination.name),
            format!("Distance: {}", self.estimate.distance_label()),
            format!("Estimated Cycling Time: {}", self.estimate.duration_label()),
            format!("Estimated Arrival Time: {}h", self.estimate.arrival_label()),
        ]
    }
}

/// Per-user ride planning state.
#[derive(Debug, Clone)]
pub struct RideSession<Tz: TimeZone = Local> {
    home: Station,
    estimator: RouteEstimator,
    mode: RideMode,
    selected: Option<Station>,
    tz: Tz,
}

impl RideSession<Local> {
    /// Create a session in the local time zone, riding now, nothing selected.
    pub fn new(home: Station, estimator: RouteEstimator) -> Self {
        Self::with_time_zone(home, estimator, Local)
    }
}

impl<Tz: TimeZone> RideSession<Tz> {
    /// Create a session whose forecast times are read in `tz`.
    pub fn with_time_zone(home: Station, estimator: RouteEstimator, tz: Tz) -> Self {
        Self {
            home,
            estimator,
            mode: RideMode::Now,
            selected: None,
            tz,
        }
    }

    /// The station rides start from.
    pub fn home(&self) -> &Station {
        &self.home
    }

    /// The currently selected destination, if any.
    pub fn selected(&self) -> Option<&Station> {
        self.selected.as_ref()
    }

    pub fn mode(&self) -> RideMode {
        self.mode
    }

    /// Switch between riding now and planning ahead.
    ///
    /// The selection is kept; call [`RideSession::reestimate`] to refresh it.
    pub fn set_mode(&mut self, mode: RideMode) {
        self.mode = mode;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// When the ride departs: `now`, or the chosen forecast time.
    pub fn departure(&self, now: DateTime<Tz>) -> Result<DateTime<Tz>, SessionError> {
        match self.mode.forecast_departure() {
            None => Ok(now),
            Some(naive) => self
                .tz
                .from_local_datetime(&naive)
                .earliest()
                .ok_or(SessionError::NonexistentLocalTime(naive)),
        }
    }

    /// Select a destination and estimate the ride from home.
    ///
    /// The selection is only recorded if the estimate succeeds.
    pub fn select(
        &mut self,
        destination: Station,
        now: DateTime<Tz>,
    ) -> Result<Selection<Tz>, SessionError> {
        if destination.id == self.home.id {
            return Err(SessionError::SameStation(destination.id));
        }

        let departure = self.departure(now)?;
        let estimate = self
            .estimator
            .estimate_between(&self.home, &destination, departure)?;

        self.selected = Some(destination.clone());

        Ok(Selection {
            destination,
            estimate,
        })
    }

    /// Recompute the estimate for the current selection, e.g. after a mode change.
    pub fn reestimate(&self, now: DateTime<Tz>) -> Result<Selection<Tz>, SessionError> {
        let destination = self.selected.clone().ok_or(SessionError::NothingSelected)?;
        let departure = self.departure(now)?;
        let estimate = self
            .estimator
            .estimate_between(&self.home, &destination, departure)?;

        Ok(Selection {
            destination,
            estimate,
        })
    }

    /// Build the ride-prediction payload for the current selection.
    pub fn prediction_request(
        &self,
        weather: &WeatherRecord,
        now: DateTime<Tz>,
    ) -> Result<RidePredictionRequest, SessionError>
    where
        Tz::Offset: fmt::Display,
    {
        let destination = self.selected.as_ref().ok_or(SessionError::NothingSelected)?;
        let temperature = weather.temp.ok_or(SessionError::MissingWeather("temperature"))?;
        let humidity = weather
            .humidity
            .ok_or(SessionError::MissingWeather("humidity"))?;
        let departure = self.departure(now)?;

        Ok(RidePredictionRequest {
            timestamp: departure.format("%Y-%m-%d %H:%M").to_string(),
            temperature,
            humidity,
            origin_station_id: self.home.id,
            destination_station_id: destination.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, StationStatus};
    use crate::estimate::EstimatorConfig;
    use chrono::Utc;

    fn station(id: u32, name: &str, lat: f64, lng: f64) -> Station {
        Station {
            id: StationId(id),
            name: name.to_string(),
            address: name.to_string(),
            position: GeoPoint::new(lat, lng).unwrap(),
            available_bikes: 5,
            available_stands: 11,
            bike_stands: 16,
            status: StationStatus::Open,
        }
    }

    fn home() -> Station {
        station(10, "DAME STREET", 53.3498, -6.2603)
    }

    fn destination() -> Station {
        station(42, "SMITHFIELD NORTH", 53.3441, -6.2675)
    }

    fn session() -> RideSession<Utc> {
        RideSession::with_time_zone(home(), RouteEstimator::default(), Utc)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 14, 30, 0).unwrap()
    }

    fn weather() -> WeatherRecord {
        WeatherRecord {
            temp: Some(11.4),
            humidity: Some(81.0),
            ..WeatherRecord::default()
        }
    }

    #[test]
    fn new_session_rides_now_with_nothing_selected() {
        let s = session();
        assert_eq!(s.mode(), RideMode::Now);
        assert!(s.selected().is_none());
        assert_eq!(s.home().id, StationId(10));
        assert_eq!(s.departure(now()).unwrap(), now());
    }

    #[test]
    fn select_estimates_from_home() {
        let mut s = session();
        let selection = s.select(destination(), now()).unwrap();

        assert_eq!(selection.destination.id, StationId(42));
        assert!((selection.estimate.distance_km - 0.793_812).abs() < 1e-6);
        assert_eq!(selection.estimate.departure, now());
        assert_eq!(s.selected().map(|st| st.id), Some(StationId(42)));

        assert_eq!(
            selection.summary_lines(),
            [
                "Destination: SMITHFIELD NORTH".to_string(),
                "Distance: 0.79 km".to_string(),
                "Estimated Cycling Time: 4 min".to_string(),
                "Estimated Arrival Time: 14:33h".to_string(),
            ]
        );
    }

    #[test]
    fn selecting_home_is_rejected() {
        let mut s = session();
        assert_eq!(
            s.select(home(), now()).unwrap_err(),
            SessionError::SameStation(StationId(10))
        );
        assert!(s.selected().is_none());
    }

    #[test]
    fn forecast_mode_departs_at_chosen_time() {
        let mut s = session();
        let date = NaiveDate::from_ymd_opt(2025, 4, 5).unwrap();
        s.set_mode(RideMode::Forecast {
            date,
            time: NaiveTime::from_hms_opt(9, 15, 0),
        });

        let selection = s.select(destination(), now()).unwrap();
        assert_eq!(
            selection.estimate.departure,
            Utc.with_ymd_and_hms(2025, 4, 5, 9, 15, 0).unwrap()
        );
        assert_eq!(selection.estimate.arrival_label(), "09:18");
    }

    #[test]
    fn forecast_without_time_departs_at_noon() {
        let mode = RideMode::Forecast {
            date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            time: None,
        };
        assert_eq!(
            mode.forecast_departure(),
            NaiveDate::from_ymd_opt(2025, 4, 5)
                .unwrap()
                .and_hms_opt(12, 0, 0)
        );
        assert_eq!(RideMode::Now.forecast_departure(), None);
    }

    #[test]
    fn reestimate_after_mode_change() {
        let mut s = session();
        assert_eq!(
            s.reestimate(now()).unwrap_err(),
            SessionError::NothingSelected
        );

        let before = s.select(destination(), now()).unwrap();
        s.set_mode(RideMode::Forecast {
            date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            time: None,
        });
        let after = s.reestimate(now()).unwrap();

        assert_eq!(after.estimate.distance_km, before.estimate.distance_km);
        assert_eq!(
            after.estimate.departure,
            Utc.with_ymd_and_hms(2025, 4, 5, 12, 0, 0).unwrap()
        );

        s.clear_selection();
        assert!(s.reestimate(now()).is_err());
    }

    #[test]
    fn estimator_configuration_is_used() {
        let fast = RouteEstimator::new(EstimatorConfig::new(24.0).unwrap());
        let mut s = RideSession::with_time_zone(home(), fast, Utc);
        let selection = s.select(destination(), now()).unwrap();
        assert!((selection.estimate.cycling_minutes - 1.984_530).abs() < 1e-6);
    }

    #[test]
    fn prediction_request_for_selection() {
        let mut s = session();
        assert_eq!(
            s.prediction_request(&weather(), now()).unwrap_err(),
            SessionError::NothingSelected
        );

        s.select(destination(), now()).unwrap();
        let req = s.prediction_request(&weather(), now()).unwrap();
        assert_eq!(
            req,
            RidePredictionRequest {
                timestamp: "2025-04-02 14:30".to_string(),
                temperature: 11.4,
                humidity: 81.0,
                origin_station_id: StationId(10),
                destination_station_id: StationId(42),
            }
        );
    }

    #[test]
    fn prediction_request_uses_forecast_time() {
        let mut s = session();
        s.select(destination(), now()).unwrap();
        s.set_mode(RideMode::Forecast {
            date: NaiveDate::from_ymd_opt(2025, 4, 5).unwrap(),
            time: NaiveTime::from_hms_opt(17, 45, 0),
        });

        let req = s.prediction_request(&weather(), now()).unwrap();
        assert_eq!(req.timestamp, "2025-04-05 17:45");
    }

    #[test]
    fn prediction_request_needs_weather() {
        let mut s = session();
        s.select(destination(), now()).unwrap();

        let no_temp = WeatherRecord {
            humidity: Some(80.0),
            ..WeatherRecord::default()
        };
        assert_eq!(
            s.prediction_request(&no_temp, now()).unwrap_err(),
            SessionError::MissingWeather("temperature")
        );

        let no_humidity = WeatherRecord {
            temp: Some(10.0),
            ..WeatherRecord::default()
        };
        assert_eq!(
            s.prediction_request(&no_humidity, now()).unwrap_err(),
            SessionError::MissingWeather("humidity")
        );
    }

    #[test]
    fn local_session_constructs() {
        let s = RideSession::new(home(), RouteEstimator::default());
        let now = Local::now();
        assert_eq!(s.departure(now).unwrap(), now);
    }
}
