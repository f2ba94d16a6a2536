//! Cycling time and its human-readable form.

use crate::domain::EstimateError;

/// Assumed average urban cycling speed.
pub const DEFAULT_AVERAGE_SPEED_KMH: f64 = 12.0;

/// Minutes needed to cycle `distance_km` at `average_speed_kmh`.
///
/// # Examples
///
/// ```
/// use bike_server::estimate::cycling_minutes;
///
/// assert_eq!(cycling_minutes(12.0, 12.0).unwrap(), 60.0);
/// assert_eq!(cycling_minutes(0.0, 12.0).unwrap(), 0.0);
/// assert!(cycling_minutes(1.0, 0.0).is_err());
/// ```
pub fn cycling_minutes(distance_km: f64, average_speed_kmh: f64) -> Result<f64, EstimateError> {
    validate_speed(average_speed_kmh)?;

    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(EstimateError::input(format!(
            "distance must be a non-negative number of kilometres, got {distance_km}"
        )));
    }

    Ok((distance_km / average_speed_kmh) * 60.0)
}

/// Check that an average speed can be divided by.
pub(crate) fn validate_speed(average_speed_kmh: f64) -> Result<(), EstimateError> {
    if !average_speed_kmh.is_finite() || average_speed_kmh <= 0.0 {
        return Err(EstimateError::configuration(format!(
            "average speed must be a positive number of km/h, got {average_speed_kmh}"
        )));
    }
    Ok(())
}

/// Render a duration as `"<H> hr <M> min"`, or `"<M> min"` under an hour.
///
/// Minutes are rounded to the nearest whole minute; a value that rounds up
/// to 60 carries into the hour.
///
/// # Examples
///
/// ```
/// use bike_server::estimate::format_duration;
///
/// assert_eq!(format_duration(125.0).unwrap(), "2 hr 5 min");
/// assert_eq!(format_duration(45.0).unwrap(), "45 min");
/// assert_eq!(format_duration(59.6).unwrap(), "1 hr 0 min");
/// ```
pub fn format_duration(minutes: f64) -> Result<String, EstimateError> {
    if !minutes.is_finite() || minutes < 0.0 {
        return Err(EstimateError::input(format!(
            "duration must be a non-negative number of minutes, got {minutes}"
        )));
    }

    let mut hours = (minutes / 60.0).floor() as u64;
    let mut mins = (minutes % 60.0).round() as u64;
    if mins == 60 {
        mins = 0;
        hours += 1;
    }

    if hours > 0 {
        Ok(format!("{hours} hr {mins} min"))
    } else {
        Ok(format!("{mins} min"))
    }
}
