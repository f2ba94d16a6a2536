//! Station lookup error types.

use crate::backend::BackendError;
use crate::domain::StationId;

/// Errors that can occur when loading or querying stations.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// Fetching from the backend failed
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Reading or writing the on-disk snapshot failed
    #[error("snapshot error: {message}")]
    Snapshot { message: String },

    /// No station with this id is known
    #[error("unknown station {0}")]
    UnknownStation(StationId),
}
