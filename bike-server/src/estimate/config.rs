//! Estimator configuration.

use crate::domain::EstimateError;

use super::duration::{DEFAULT_AVERAGE_SPEED_KMH, validate_speed};

/// Configuration parameters for route estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorConfig {
    /// Average cycling speed (km/h). Always finite and positive.
    average_speed_kmh: f64,
}

impl EstimatorConfig {
    /// Create a configuration with the given average cycling speed.
    pub fn new(average_speed_kmh: f64) -> Result<Self, EstimateError> {
        validate_speed(average_speed_kmh)?;
        Ok(Self { average_speed_kmh })
    }

    /// Returns the average cycling speed in km/h.
    pub fn average_speed_kmh(&self) -> f64 {
        self.average_speed_kmh
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: DEFAULT_AVERAGE_SPEED_KMH,
        }
    }
}
