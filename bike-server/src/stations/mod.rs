//! Station list loading and lookup.
//!
//! Provides id → station lookup, fetched from the backend at startup and
//! refreshable, with an on-disk snapshot to fall back on.

mod board;
mod error;
mod snapshot;

pub use board::StationBoard;
pub use error::StationError;
pub use snapshot::{SavedStations, StationSnapshot, StationSnapshotConfig};
