//! Destination reachability table.
//!
//! Any journey to a destination must end on a trip that either passes
//! through the destination or passes within one footpath of it. Indexing
//! those final boarding points per (destination, route) up front lets the
//! round engine answer "can this route still finish at this destination?"
//! with one hash lookup before it scans any trip legs.

use std::collections::HashMap;

use chrono::Duration;

use crate::network::{Network, RouteId, StopId};

/// One way to finish a journey at a destination from a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastLeg {
    /// Position on the route where the rider alights.
    pub index: usize,
    /// Walk time after alighting; zero when the route serves the
    /// destination directly.
    pub extra: Duration,
    /// The alighting stop (the destination itself, or the footpath's near
    /// end).
    pub stop: StopId,
}

/// Per-destination index of final boarding points, keyed by route.
///
/// Destinations are addressed by their dense index in the run's
/// destination list, not by stop id.
pub struct LastLegIndex {
    by_dest: Vec<HashMap<RouteId, Vec<LastLeg>>>,
}

impl LastLegIndex {
    /// Build the table for one run's destination set.
    pub fn build(network: &Network, destinations: &[StopId]) -> Self {
        let mut by_dest = Vec::with_capacity(destinations.len());
        for &dest in destinations {
            let mut by_route: HashMap<RouteId, Vec<LastLeg>> = HashMap::new();

            // Routes within one footpath of the destination.
            for fp in network.footpaths_from(dest) {
                for &route in network.routes_at(fp.to) {
                    if let Some(index) = network.stop_index(route, fp.to) {
                        by_route.entry(route).or_default().push(LastLeg {
                            index,
                            extra: fp.duration,
                            stop: fp.to,
                        });
                    }
                }
            }

            // Routes serving the destination directly.
            for &route in network.routes_at(dest) {
                if let Some(index) = network.stop_index(route, dest) {
                    by_route.entry(route).or_default().push(LastLeg {
                        index,
                        extra: Duration::zero(),
                        stop: dest,
                    });
                }
            }

            by_dest.push(by_route);
        }
        Self { by_dest }
    }

    /// Final boarding points on `route` for the destination at `dest`.
    ///
    /// Empty when the route cannot finish at that destination.
    pub fn entries(&self, dest: usize, route: RouteId) -> &[LastLeg] {
        self.by_dest[dest]
            .get(&route)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{Time, TripId};

    fn t(s: &str) -> Time {
        Time::parse(s).unwrap()
    }

    fn network() -> Network {
        // Route 0: 0 -> 1 -> 2, route 1: 3 -> 1 -> 4, footpath 2 <-> 4.
        Network::builder()
            .route(
                RouteId(0),
                vec![StopId(0), StopId(1), StopId(2)],
                vec![vec![t("08:00:00"), t("08:10:00"), t("08:20:00")]],
            )
            .route(
                RouteId(1),
                vec![StopId(3), StopId(1), StopId(4)],
                vec![vec![t("08:05:00"), t("08:15:00"), t("08:30:00")]],
            )
            .footpath(StopId(2), StopId(4), Duration::seconds(90))
            .build()
            .unwrap()
    }

    #[test]
    fn direct_entry_at_destination_index() {
        let network = network();
        let index = LastLegIndex::build(&network, &[StopId(2)]);

        let entries = index.entries(0, RouteId(0));
        assert!(entries.contains(&LastLeg {
            index: 2,
            extra: Duration::zero(),
            stop: StopId(2),
        }));
    }

    #[test]
    fn footpath_entry_on_other_route() {
        let network = network();
        let index = LastLegIndex::build(&network, &[StopId(2)]);

        // Stop 2 is walkable from stop 4 on route 1.
        let entries = index.entries(0, RouteId(1));
        assert_eq!(
            entries,
            &[LastLeg {
                index: 2,
                extra: Duration::seconds(90),
                stop: StopId(4),
            }]
        );
    }

    #[test]
    fn walking_entries_precede_direct_entries() {
        let network = Network::builder()
            .route(
                RouteId(0),
                vec![StopId(0), StopId(1), StopId(2)],
                vec![vec![t("08:00:00"), t("08:10:00"), t("08:20:00")]],
            )
            // Stop 1 on the same route is walkable from stop 2.
            .footpath(StopId(1), StopId(2), Duration::seconds(60))
            .build()
            .unwrap();
        let index = LastLegIndex::build(&network, &[StopId(1)]);

        let entries = index.entries(0, RouteId(0));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stop, StopId(2));
        assert!(entries[0].extra > Duration::zero());
        assert_eq!(entries[1].stop, StopId(1));
        assert_eq!(entries[1].extra, Duration::zero());
    }

    #[test]
    fn unreachable_destination_has_no_entries() {
        let network = network();
        let index = LastLegIndex::build(&network, &[StopId(3)]);
        // Route 0 never reaches stop 3, directly or by footpath.
        assert!(index.entries(0, RouteId(0)).is_empty());
    }

    #[test]
    fn unknown_trip_set_is_irrelevant_here() {
        // Edges into the table come only from routes and footpaths; a
        // network without transfers still indexes normally.
        let network = network();
        assert!(!network.has_transfers(TripId::new(RouteId(0), 0)));
        let index = LastLegIndex::build(&network, &[StopId(4)]);
        assert!(!index.entries(0, RouteId(1)).is_empty());
    }
}
