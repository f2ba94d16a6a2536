//! Arrival time from a departure instant and a cycling time.

use chrono::{DateTime, Duration, Local, TimeZone};

use crate::domain::EstimateError;

/// Milliseconds in one minute.
const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// The instant reached after cycling `cycling_minutes` from `departure`.
///
/// The offset is rounded to whole milliseconds. The result stays in the
/// departure's time zone.
///
/// # Examples
///
/// ```
/// use bike_server::estimate::estimate_arrival;
/// use chrono::{TimeZone, Utc};
///
/// let departure = Utc.with_ymd_and_hms(2025, 4, 2, 14, 30, 0).unwrap();
/// let arrival = estimate_arrival(departure, 30.0).unwrap();
/// assert_eq!(arrival, Utc.with_ymd_and_hms(2025, 4, 2, 15, 0, 0).unwrap());
/// ```
pub fn estimate_arrival<Tz: TimeZone>(
    departure: DateTime<Tz>,
    cycling_minutes: f64,
) -> Result<DateTime<Tz>, EstimateError> {
    if !cycling_minutes.is_finite() || cycling_minutes < 0.0 {
        return Err(EstimateError::input(format!(
            "cycling time must be a non-negative number of minutes, got {cycling_minutes}"
        )));
    }

    let millis = (cycling_minutes * MILLIS_PER_MINUTE).round();
    if millis > i64::MAX as f64 {
        return Err(EstimateError::input(format!(
            "cycling time of {cycling_minutes} minutes is too large"
        )));
    }

    departure
        .checked_add_signed(Duration::milliseconds(millis as i64))
        .ok_or_else(|| {
            EstimateError::input(format!(
                "arrival after {cycling_minutes} minutes is outside the calendar range"
            ))
        })
}

/// [`estimate_arrival`] departing now, in the local time zone.
pub fn estimate_arrival_from_now(cycling_minutes: f64) -> Result<DateTime<Local>, EstimateError> {
    estimate_arrival(Local::now(), cycling_minutes)
}

/// 24-hour `HH:MM` clock reading of an instant in its own time zone.
pub fn format_clock<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format("%H:%M").to_string()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    proptest! {
        /// Arrival offsets are additive over whole-millisecond splits
        #[test]
        fn additive(secs in 0i64..4_000_000_000, a in 0u32..10_000, b in 0u32..10_000) {
            let dep = Utc.timestamp_opt(secs, 0).unwrap();
            let a = a as f64;
            let b = b as f64;
            let direct = estimate_arrival(dep, a + b).unwrap();
            let stepped = estimate_arrival(estimate_arrival(dep, a).unwrap(), b).unwrap();
            prop_assert_eq!(direct, stepped);
        }

        /// Arrival is never before departure
        #[test]
        fn monotone(secs in 0i64..4_000_000_000, m in 0.0f64..100_000.0) {
            let dep = Utc.timestamp_opt(secs, 0).unwrap();
            prop_assert!(estimate_arrival(dep, m).unwrap() >= dep);
        }
    }
}
