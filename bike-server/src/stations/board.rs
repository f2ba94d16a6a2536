//! Shared station lookup.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::cache::CachedBackendClient;
use crate::domain::{Station, StationId};

use super::error::StationError;

/// Thread-safe station lookup by id, with background refresh.
#[derive(Clone)]
pub struct StationBoard {
    inner: Arc<RwLock<HashMap<StationId, Station>>>,
    client: Arc<CachedBackendClient>,
}

impl StationBoard {
    /// Create a board by fetching the station list from the backend.
    ///
    /// This will fail if the backend is unreachable.
    pub async fn load(client: Arc<CachedBackendClient>) -> Result<Self, StationError> {
        let stations = client.stations().await?;
        info!(count = stations.len(), "loaded stations from backend");

        Ok(Self {
            inner: Arc::new(RwLock::new(build_map(stations))),
            client,
        })
    }

    /// Create a board from an already-known station list (e.g. a snapshot).
    pub fn from_stations(client: Arc<CachedBackendClient>, stations: Vec<Station>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(build_map(stations))),
            client,
        }
    }

    /// Look up a station by id.
    pub async fn get(&self, id: StationId) -> Option<Station> {
        let guard = self.inner.read().await;
        guard.get(&id).cloned()
    }

    /// Look up a station by id, failing if it is unknown.
    pub async fn require(&self, id: StationId) -> Result<Station, StationError> {
        self.get(id).await.ok_or(StationError::UnknownStation(id))
    }

    /// Get the number of stations on the board.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.len()
    }

    /// Check if the board is empty.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_empty()
    }

    /// All stations, sorted by name.
    pub async fn sorted_by_name(&self) -> Vec<Station> {
        let guard = self.inner.read().await;
        let mut stations: Vec<Station> = guard.values().cloned().collect();
        stations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        stations
    }

    /// Stations whose name contains `query` (case-insensitive), sorted by name.
    pub async fn search(&self, query: &str, limit: usize) -> Vec<Station> {
        let needle = query.trim().to_lowercase();
        self.sorted_by_name()
            .await
            .into_iter()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .take(limit)
            .collect()
    }

    /// Refresh the station data from the backend.
    ///
    /// On success, replaces the current mapping. On failure, the existing
    /// mapping is preserved and the error is returned.
    pub async fn refresh(&self) -> Result<usize, StationError> {
        let stations = self.client.refresh_stations().await?;
        let map = build_map(stations);
        let count = map.len();

        let mut guard = self.inner.write().await;
        *guard = map;

        Ok(count)
    }
}

/// Build the id → station map.
fn build_map(stations: Vec<Station>) -> HashMap<StationId, Station> {
    stations.into_iter().map(|s| (s.id, s)).collect()
}
