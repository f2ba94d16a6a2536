//! Disk snapshot of the last good station list.
//!
//! Station positions and names rarely change, so a day-old list is still
//! good enough to estimate routes when the backend is down. Availability
//! counts in a snapshot are stale by definition; callers should say how
//! old they are.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::backend::StationRecord;

use super::error::StationError;

/// How long a snapshot stays usable by default.
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// A station list as read back from disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStations {
    pub saved_at: DateTime<Utc>,
    pub stations: Vec<StationRecord>,
}

impl SavedStations {
    /// How old the snapshot is at `now`. A timestamp in the future counts as zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> TimeDelta {
        (now - self.saved_at).max(TimeDelta::zero())
    }
}

/// Configuration for the station snapshot.
#[derive(Debug, Clone)]
pub struct StationSnapshotConfig {
    pub path: PathBuf,
    /// Snapshots at least this old are ignored.
    pub max_age: Duration,
}

impl StationSnapshotConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }
}

impl Default for StationSnapshotConfig {
    fn default() -> Self {
        Self::new("stations_snapshot.json")
    }
}

/// Handle on the snapshot file.
#[derive(Debug, Clone)]
pub struct StationSnapshot {
    config: StationSnapshotConfig,
}

impl StationSnapshot {
    pub fn new(config: StationSnapshotConfig) -> Self {
        Self { config }
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Load the snapshot if it exists, parses and is younger than `max_age`.
    pub fn load(&self) -> Option<SavedStations> {
        self.load_at(Utc::now())
    }

    /// [`load`](Self::load) with an explicit clock.
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<SavedStations> {
        let path = &self.config.path;
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %path.display(), "no station snapshot: {e}");
                return None;
            }
        };

        let saved: SavedStations = match serde_json::from_str(&contents) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(path = %path.display(), "ignoring unreadable station snapshot: {e}");
                return None;
            }
        };

        let age = saved.age_at(now);
        let too_old = age.to_std().is_ok_and(|age| age >= self.config.max_age);
        if too_old {
            debug!(
                path = %path.display(),
                age_mins = age.num_minutes(),
                "station snapshot expired"
            );
            return None;
        }

        Some(saved)
    }

    /// Write `stations` as the new snapshot, stamped with the current time.
    pub fn save(&self, stations: &[StationRecord]) -> Result<(), StationError> {
        self.save_at(stations, Utc::now())
    }

    /// [`save`](Self::save) with an explicit timestamp.
    ///
    /// The file is written to a temporary sibling and renamed into place,
    /// so readers never see a half-written snapshot.
    pub fn save_at(
        &self,
        stations: &[StationRecord],
        saved_at: DateTime<Utc>,
    ) -> Result<(), StationError> {
        let snapshot_error = |message: String| StationError::Snapshot { message };

        let dir = match self.config.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| snapshot_error(format!("cannot create {}: {e}", dir.display())))?;

        let saved = SavedStations {
            saved_at,
            stations: stations.to_vec(),
        };

        let file = NamedTempFile::new_in(dir)
            .map_err(|e| snapshot_error(format!("cannot create temporary file: {e}")))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &saved)
            .map_err(|e| snapshot_error(format!("cannot write snapshot: {e}")))?;
        writer
            .flush()
            .map_err(|e| snapshot_error(format!("cannot write snapshot: {e}")))?;

        let file = writer
            .into_inner()
            .map_err(|e| snapshot_error(format!("cannot write snapshot: {}", e.error())))?;
        file.persist(&self.config.path).map_err(|e| {
            snapshot_error(format!(
                "cannot replace {}: {}",
                self.config.path.display(),
                e.error
            ))
        })?;

        debug!(
            path = %self.config.path.display(),
            count = stations.len(),
            "saved station snapshot"
        );
        Ok(())
    }
}
