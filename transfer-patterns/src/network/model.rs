//! Static network indices.
//!
//! The search core consumes the network through read-only lookups: routes
//! by stop, stop sequences and timetables by route, footpaths by stop, and
//! the precomputed trip-to-trip transfer graph. All of these are built once
//! by [`NetworkBuilder`] and never mutated afterwards.
//!
//! Absent edges are not errors: every lookup on a missing key returns an
//! empty slice or `None`, so callers can treat "no footpath here" and "no
//! transfer from this trip" uniformly.

use std::collections::{BTreeSet, HashMap};

use chrono::Duration;

use super::{RouteId, StopId, Time, TripId};

/// A fixed-duration walking connection out of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footpath {
    pub to: StopId,
    pub duration: Duration,
}

/// One precomputed trip-to-trip transfer edge.
///
/// Alighting the owning trip at the edge's stop index, a rider can board
/// `to_trip` at `board_index`, possibly after one footpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferEdge {
    pub to_trip: TripId,
    pub board_index: usize,
}

/// A trip passing through a stop, as seen from that stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    pub trip: TripId,
    /// Arrival time of the trip at the stop.
    pub time: Time,
    /// Position of the stop in the trip's route.
    pub stop_index: usize,
}

#[derive(Debug)]
struct Route {
    stops: Vec<StopId>,
    /// One arrival-time row per trip, aligned one-to-one with `stops`.
    trips: Vec<Vec<Time>>,
}

/// Error building a network from preprocessed inputs.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("duplicate route id {0}")]
    DuplicateRoute(RouteId),

    #[error("route {0} has no stops")]
    EmptyRoute(RouteId),

    #[error("route {route} has {stops} stops but trip {seq} has {times} arrival times")]
    MisalignedTrip {
        route: RouteId,
        seq: usize,
        stops: usize,
        times: usize,
    },

    #[error("transfer references unknown trip {0}")]
    UnknownTrip(TripId),

    #[error("transfer index {index} is out of range for trip {trip}")]
    TransferIndexOutOfRange { trip: TripId, index: usize },
}

/// Immutable transit network indices.
#[derive(Debug)]
pub struct Network {
    /// Sorted list of every stop that appears on a route.
    stops: Vec<StopId>,
    routes_by_stop: HashMap<StopId, Vec<RouteId>>,
    routes: HashMap<RouteId, Route>,
    footpaths: HashMap<StopId, Vec<Footpath>>,
    stop_index: HashMap<(RouteId, StopId), usize>,
    /// Per trip, per stop index, the outgoing transfer edges.
    transfers: HashMap<TripId, Vec<Vec<TransferEdge>>>,
}

impl Network {
    /// Start building a network.
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    /// Every stop served by at least one route, in ascending id order.
    pub fn stops(&self) -> &[StopId] {
        &self.stops
    }

    /// Whether any route serves the stop.
    pub fn has_stop(&self, stop: StopId) -> bool {
        self.stops.binary_search(&stop).is_ok()
    }

    /// Routes passing through a stop.
    pub fn routes_at(&self, stop: StopId) -> &[RouteId] {
        self.routes_by_stop
            .get(&stop)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// The ordered stop sequence of a route.
    pub fn stops_of(&self, route: RouteId) -> &[StopId] {
        self.routes
            .get(&route)
            .map(|r| r.stops.as_slice())
            .unwrap_or(&[])
    }

    /// Number of stops on a route.
    pub fn route_len(&self, route: RouteId) -> usize {
        self.stops_of(route).len()
    }

    /// Number of trips in a route's timetable.
    pub fn num_trips(&self, route: RouteId) -> usize {
        self.routes.get(&route).map(|r| r.trips.len()).unwrap_or(0)
    }

    /// Arrival times of a trip, aligned with the route's stop sequence.
    pub fn trip_arrivals(&self, trip: TripId) -> &[Time] {
        self.routes
            .get(&trip.route)
            .and_then(|r| r.trips.get(trip.seq as usize))
            .map(|t| t.as_slice())
            .unwrap_or(&[])
    }

    /// Position of a stop in a route's stop sequence (first occurrence).
    pub fn stop_index(&self, route: RouteId, stop: StopId) -> Option<usize> {
        self.stop_index.get(&(route, stop)).copied()
    }

    /// Outgoing footpaths of a stop.
    pub fn footpaths_from(&self, stop: StopId) -> &[Footpath] {
        self.footpaths
            .get(&stop)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Walk duration between two stops, if a footpath connects them.
    pub fn footpath_duration(&self, from: StopId, to: StopId) -> Option<Duration> {
        self.footpaths_from(from)
            .iter()
            .find(|fp| fp.to == to)
            .map(|fp| fp.duration)
    }

    /// Whether the trip has any outgoing transfer edge.
    pub fn has_transfers(&self, trip: TripId) -> bool {
        self.transfers.contains_key(&trip)
    }

    /// Transfer edges available when alighting `trip` at `stop_index`.
    pub fn transfers_from(&self, trip: TripId, stop_index: usize) -> &[TransferEdge] {
        self.transfers
            .get(&trip)
            .and_then(|per_stop| per_stop.get(stop_index))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Every trip passing through a stop, with its arrival time there.
    pub fn departures_at(&self, stop: StopId) -> Vec<Departure> {
        let mut out = Vec::new();
        for &route in self.routes_at(stop) {
            let Some(index) = self.stop_index(route, stop) else {
                continue;
            };
            let Some(r) = self.routes.get(&route) else {
                continue;
            };
            for (seq, arrivals) in r.trips.iter().enumerate() {
                out.push(Departure {
                    trip: TripId::new(route, seq as u32),
                    time: arrivals[index],
                    stop_index: index,
                });
            }
        }
        out
    }
}

/// Builder for [`Network`].
///
/// Footpaths are symmetric: adding one stores both directions with the same
/// duration, so each pair should be added once.
#[derive(Default)]
pub struct NetworkBuilder {
    routes: Vec<(RouteId, Vec<StopId>, Vec<Vec<Time>>)>,
    footpaths: Vec<(StopId, StopId, Duration)>,
    transfers: Vec<(TripId, usize, TransferEdge)>,
}

impl NetworkBuilder {
    /// Add a route with its stop sequence and per-trip arrival times.
    pub fn route(mut self, id: RouteId, stops: Vec<StopId>, trips: Vec<Vec<Time>>) -> Self {
        self.routes.push((id, stops, trips));
        self
    }

    /// Add a symmetric footpath between two stops.
    pub fn footpath(mut self, a: StopId, b: StopId, duration: Duration) -> Self {
        self.footpaths.push((a, b, duration));
        self
    }

    /// Add a trip-to-trip transfer edge.
    pub fn transfer(mut self, from: TripId, at_index: usize, to: TripId, to_index: usize) -> Self {
        self.transfers.push((
            from,
            at_index,
            TransferEdge {
                to_trip: to,
                board_index: to_index,
            },
        ));
        self
    }

    /// Validate and build the network.
    pub fn build(self) -> Result<Network, NetworkError> {
        let mut routes = HashMap::new();
        let mut routes_by_stop: HashMap<StopId, Vec<RouteId>> = HashMap::new();
        let mut stop_index = HashMap::new();
        let mut all_stops = BTreeSet::new();

        for (id, stops, trips) in self.routes {
            if stops.is_empty() {
                return Err(NetworkError::EmptyRoute(id));
            }
            for (seq, arrivals) in trips.iter().enumerate() {
                if arrivals.len() != stops.len() {
                    return Err(NetworkError::MisalignedTrip {
                        route: id,
                        seq,
                        stops: stops.len(),
                        times: arrivals.len(),
                    });
                }
            }
            for (index, &stop) in stops.iter().enumerate() {
                all_stops.insert(stop);
                let serving = routes_by_stop.entry(stop).or_default();
                if !serving.contains(&id) {
                    serving.push(id);
                }
                stop_index.entry((id, stop)).or_insert(index);
            }
            if routes.insert(id, Route { stops, trips }).is_some() {
                return Err(NetworkError::DuplicateRoute(id));
            }
        }

        let mut footpaths: HashMap<StopId, Vec<Footpath>> = HashMap::new();
        for (a, b, duration) in self.footpaths {
            footpaths.entry(a).or_default().push(Footpath { to: b, duration });
            footpaths.entry(b).or_default().push(Footpath { to: a, duration });
        }

        let mut transfers: HashMap<TripId, Vec<Vec<TransferEdge>>> = HashMap::new();
        for (from, at_index, edge) in self.transfers {
            let from_len = route_trip_len(&routes, from)?;
            if at_index >= from_len {
                return Err(NetworkError::TransferIndexOutOfRange {
                    trip: from,
                    index: at_index,
                });
            }
            let to_len = route_trip_len(&routes, edge.to_trip)?;
            if edge.board_index >= to_len {
                return Err(NetworkError::TransferIndexOutOfRange {
                    trip: edge.to_trip,
                    index: edge.board_index,
                });
            }
            transfers
                .entry(from)
                .or_insert_with(|| vec![Vec::new(); from_len])[at_index]
                .push(edge);
        }

        Ok(Network {
            stops: all_stops.into_iter().collect(),
            routes_by_stop,
            routes,
            footpaths,
            stop_index,
            transfers,
        })
    }
}

fn route_trip_len(routes: &HashMap<RouteId, Route>, trip: TripId) -> Result<usize, NetworkError> {
    let route = routes
        .get(&trip.route)
        .ok_or(NetworkError::UnknownTrip(trip))?;
    if (trip.seq as usize) >= route.trips.len() {
        return Err(NetworkError::UnknownTrip(trip));
    }
    Ok(route.stops.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Time {
        Time::parse(s).unwrap()
    }

    fn sample() -> Network {
        Network::builder()
            .route(
                RouteId(0),
                vec![StopId(0), StopId(1), StopId(2)],
                vec![
                    vec![t("08:00:00"), t("08:10:00"), t("08:20:00")],
                    vec![t("09:00:00"), t("09:10:00"), t("09:20:00")],
                ],
            )
            .route(
                RouteId(1),
                vec![StopId(3), StopId(1), StopId(4)],
                vec![vec![t("08:05:00"), t("08:15:00"), t("08:30:00")]],
            )
            .footpath(StopId(2), StopId(5), Duration::seconds(120))
            .transfer(
                TripId::new(RouteId(0), 0),
                1,
                TripId::new(RouteId(1), 0),
                1,
            )
            .build()
            .unwrap()
    }

    #[test]
    fn stops_are_sorted_and_route_derived() {
        let network = sample();
        assert_eq!(
            network.stops(),
            &[StopId(0), StopId(1), StopId(2), StopId(3), StopId(4)]
        );
        assert!(network.has_stop(StopId(4)));
        // Footpath-only endpoints are not network stops.
        assert!(!network.has_stop(StopId(5)));
    }

    #[test]
    fn route_lookups() {
        let network = sample();
        assert_eq!(network.routes_at(StopId(1)), &[RouteId(0), RouteId(1)]);
        assert_eq!(network.stops_of(RouteId(1))[2], StopId(4));
        assert_eq!(network.stop_index(RouteId(1), StopId(4)), Some(2));
        assert_eq!(network.stop_index(RouteId(1), StopId(0)), None);
        assert_eq!(network.num_trips(RouteId(0)), 2);
        assert_eq!(
            network.trip_arrivals(TripId::new(RouteId(0), 1))[2],
            t("09:20:00")
        );
    }

    #[test]
    fn absent_lookups_are_empty() {
        let network = sample();
        assert!(network.routes_at(StopId(99)).is_empty());
        assert!(network.stops_of(RouteId(9)).is_empty());
        assert!(network.trip_arrivals(TripId::new(RouteId(0), 7)).is_empty());
        assert!(network.footpaths_from(StopId(0)).is_empty());
        assert!(
            network
                .transfers_from(TripId::new(RouteId(1), 0), 0)
                .is_empty()
        );
        assert!(!network.has_transfers(TripId::new(RouteId(1), 0)));
    }

    #[test]
    fn footpaths_are_symmetric() {
        let network = sample();
        let d = Duration::seconds(120);
        assert_eq!(network.footpath_duration(StopId(2), StopId(5)), Some(d));
        assert_eq!(network.footpath_duration(StopId(5), StopId(2)), Some(d));
        assert_eq!(network.footpath_duration(StopId(2), StopId(4)), None);
    }

    #[test]
    fn transfer_lookup() {
        let network = sample();
        let from = TripId::new(RouteId(0), 0);
        assert!(network.has_transfers(from));
        assert_eq!(
            network.transfers_from(from, 1),
            &[TransferEdge {
                to_trip: TripId::new(RouteId(1), 0),
                board_index: 1,
            }]
        );
        assert!(network.transfers_from(from, 0).is_empty());
        assert!(network.transfers_from(from, 2).is_empty());
    }

    #[test]
    fn departures_list_every_trip_through_the_stop() {
        let network = sample();
        let departures = network.departures_at(StopId(1));
        assert_eq!(departures.len(), 3);
        assert!(departures.contains(&Departure {
            trip: TripId::new(RouteId(0), 1),
            time: t("09:10:00"),
            stop_index: 1,
        }));
        assert!(departures.contains(&Departure {
            trip: TripId::new(RouteId(1), 0),
            time: t("08:15:00"),
            stop_index: 1,
        }));
        assert!(network.departures_at(StopId(99)).is_empty());
    }

    #[test]
    fn network_is_debuggable() {
        // Assertions on `Result<Network, _>` need the Ok side printable.
        let rendered = format!("{:?}", sample());
        assert!(rendered.contains("StopId(0)"));
        assert!(rendered.contains("RouteId(1)"));
    }

    #[test]
    fn build_rejects_misaligned_trip() {
        let err = Network::builder()
            .route(
                RouteId(0),
                vec![StopId(0), StopId(1)],
                vec![vec![t("08:00:00")]],
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, NetworkError::MisalignedTrip { .. }));
    }

    #[test]
    fn build_rejects_bad_transfer_references() {
        let base = || {
            Network::builder().route(
                RouteId(0),
                vec![StopId(0), StopId(1)],
                vec![vec![t("08:00:00"), t("08:10:00")]],
            )
        };

        let err = base()
            .transfer(
                TripId::new(RouteId(0), 0),
                1,
                TripId::new(RouteId(2), 0),
                0,
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, NetworkError::UnknownTrip(_)));

        let err = base()
            .transfer(
                TripId::new(RouteId(0), 0),
                5,
                TripId::new(RouteId(0), 0),
                0,
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, NetworkError::TransferIndexOutOfRange { .. }));
    }

    #[test]
    fn build_rejects_duplicate_route() {
        let err = Network::builder()
            .route(RouteId(0), vec![StopId(0)], vec![])
            .route(RouteId(0), vec![StopId(1)], vec![])
            .build()
            .unwrap_err();
        assert!(matches!(err, NetworkError::DuplicateRoute(RouteId(0))));
    }
}
