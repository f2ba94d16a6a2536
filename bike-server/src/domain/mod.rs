//! Domain types for the bike-share journey helper.
//!
//! All types enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod error;
mod geo;
mod station;

pub use error::EstimateError;
pub use geo::GeoPoint;
pub use station::{Station, StationId, StationStatus};
