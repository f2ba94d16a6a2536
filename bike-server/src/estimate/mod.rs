//! Route & arrival estimation.
//!
//! Turns two geographic points and a departure time into a distance, a
//! cycling duration and an arrival time. Everything here is pure and
//! synchronous: no I/O, no shared state.

mod arrival;
mod config;
mod distance;
mod duration;
mod route;

pub use arrival::{estimate_arrival, estimate_arrival_from_now, format_clock};
pub use config::EstimatorConfig;
pub use distance::{EARTH_RADIUS_KM, great_circle_distance_km};
pub use duration::{DEFAULT_AVERAGE_SPEED_KMH, cycling_minutes, format_duration};
pub use route::{RouteEstimate, RouteEstimator};
