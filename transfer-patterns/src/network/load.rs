//! Network snapshot loader.
//!
//! The GTFS preprocessor (out of scope here) emits the static indices as a
//! single JSON document: routes with their stop sequences and per-trip
//! arrival times, symmetric footpaths, and the trip-to-trip transfer graph.
//! This module deserializes that snapshot and feeds it through
//! [`NetworkBuilder`](super::NetworkBuilder) validation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Network, NetworkError, StopId, Time, TripId};

/// Error loading a network snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse network snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid network: {0}")]
    Network(#[from] NetworkError),
}

#[derive(Deserialize)]
struct NetworkFile {
    routes: Vec<RouteFile>,
    #[serde(default)]
    footpaths: Vec<FootpathFile>,
    #[serde(default)]
    transfers: Vec<TransferFile>,
}

#[derive(Deserialize)]
struct RouteFile {
    id: super::RouteId,
    stops: Vec<StopId>,
    /// Arrival times in seconds since the start of the service day.
    trips: Vec<Vec<Time>>,
}

/// A walkable stop pair; each pair appears once and is stored symmetrically.
#[derive(Deserialize)]
struct FootpathFile {
    from: StopId,
    to: StopId,
    seconds: i64,
}

#[derive(Deserialize)]
struct TransferFile {
    from: TripId,
    at_index: usize,
    to: TripId,
    to_index: usize,
}

/// Load and validate a network snapshot from a JSON file.
pub fn load_network(path: &Path) -> Result<Network, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: NetworkFile = serde_json::from_str(&contents)?;

    let mut builder = Network::builder();
    for route in file.routes {
        builder = builder.route(route.id, route.stops, route.trips);
    }
    for fp in file.footpaths {
        builder = builder.footpath(fp.from, fp.to, chrono::Duration::seconds(fp.seconds));
    }
    for tr in file.transfers {
        builder = builder.transfer(tr.from, tr.at_index, tr.to, tr.to_index);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RouteId;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
        "routes": [
            {"id": 0, "stops": [10, 11, 12], "trips": [[28800, 29400, 30000]]},
            {"id": 1, "stops": [12, 13], "trips": [[30300, 30900]]}
        ],
        "footpaths": [
            {"from": 13, "to": 14, "seconds": 180}
        ],
        "transfers": [
            {"from": {"route": 0, "seq": 0}, "at_index": 2,
             "to": {"route": 1, "seq": 0}, "to_index": 0}
        ]
    }"#;

    fn write_snapshot(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_snapshot() {
        let file = write_snapshot(SNAPSHOT);
        let network = load_network(file.path()).unwrap();

        assert_eq!(network.stops().len(), 4);
        assert_eq!(
            network.trip_arrivals(TripId::new(RouteId(0), 0))[0],
            Time::from_seconds(28800)
        );
        assert_eq!(
            network.footpath_duration(StopId(14), StopId(13)),
            Some(chrono::Duration::seconds(180))
        );
        assert!(network.has_transfers(TripId::new(RouteId(0), 0)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_network(Path::new("/nonexistent/network.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let file = write_snapshot("{\"routes\": [");
        let err = load_network(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn invalid_structure_is_a_network_error() {
        let file = write_snapshot(
            r#"{"routes": [{"id": 0, "stops": [1, 2], "trips": [[100]]}]}"#,
        );
        let err = load_network(file.path()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Network(NetworkError::MisalignedTrip { .. })
        ));
    }
}
