//! Conversion from backend wire records to domain types.

use tracing::warn;

use crate::domain::{GeoPoint, Station, StationId, StationStatus};

use super::types::StationRecord;

/// Why a station record could not be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("station {0} has no position")]
    MissingPosition(StationId),

    #[error("station {id} has an invalid position: {reason}")]
    InvalidPosition { id: StationId, reason: String },
}

/// Convert one station record.
///
/// Missing counts default to zero and a missing name falls back to the
/// address, then to the station number.
pub fn station_from_record(record: &StationRecord) -> Result<Station, ConversionError> {
    let id = StationId(record.station_id);

    let (lat, lng) = match record.position {
        Some(p) => match (p.lat, p.lng) {
            (Some(lat), Some(lng)) => (lat, lng),
            _ => return Err(ConversionError::MissingPosition(id)),
        },
        None => return Err(ConversionError::MissingPosition(id)),
    };

    let position = GeoPoint::new(lat, lng).map_err(|e| ConversionError::InvalidPosition {
        id,
        reason: e.to_string(),
    })?;

    let address = record.address.clone().unwrap_or_default();
    let name = record
        .name
        .clone()
        .filter(|n| !n.trim().is_empty())
        .or_else(|| Some(address.clone()).filter(|a| !a.trim().is_empty()))
        .unwrap_or_else(|| format!("Station {id}"));

    let available_bikes = record.available_bikes.unwrap_or(0);
    let available_stands = record.available_bike_stands.unwrap_or(0);

    Ok(Station {
        id,
        name,
        address,
        position,
        available_bikes,
        available_stands,
        bike_stands: record
            .bike_stands
            .unwrap_or(available_bikes.saturating_add(available_stands)),
        status: record
            .status
            .as_deref()
            .map(StationStatus::parse)
            .unwrap_or_default(),
    })
}

/// Convert a station list, dropping records that cannot be placed on a map.
///
/// The result is sorted by name, then id.
pub fn stations_from_records(records: &[StationRecord]) -> Vec<Station> {
    let mut stations: Vec<Station> = records
        .iter()
        .filter_map(|record| match station_from_record(record) {
            Ok(station) => Some(station),
            Err(e) => {
                warn!("skipping station record: {e}");
                None
            }
        })
        .collect();

    stations.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    stations
}
