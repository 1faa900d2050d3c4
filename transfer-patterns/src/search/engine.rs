//! The round engine: one-to-many profile search from a single source.
//!
//! One [`PatternSearch::run`] call sweeps every departure at the source in
//! descending time order. Labels and boarding bounds persist across the
//! sweep, so a later departure's journeys prune an earlier departure's
//! search; the segment queue is rebuilt per departure because predecessor
//! links index into it.
//!
//! Round `n` scans segments reachable with `n - 1` transfers. A segment
//! scan does two things: the shortcut check against the destination
//! reachability table, which may improve labels, and the transfer
//! expansion, which enqueues dominating continuations into round `n + 1`.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::journey::TransferPattern;
use crate::network::{Departure, Network, StopId, TransferEdge, TripId};

use super::config::SearchConfig;
use super::reachability::LastLegIndex;
use super::reconstruct::reconstruct_journey;
use super::state::{
    BoardingBounds, ParetoLabels, Predecessor, ReachedVia, SegmentQueue, TripSegment,
};

/// Error starting a search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("no route serves stop {0}")]
    UnknownStop(StopId),
}

/// A reconstruction that failed; the search itself carries on.
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructFailure {
    pub destination: StopId,
    pub transfers: usize,
    pub reason: String,
}

/// All transfer patterns found from one source stop.
#[derive(Debug, Clone, Serialize)]
pub struct PatternSet {
    pub source: StopId,
    pub patterns: Vec<TransferPattern>,
    pub failures: Vec<ReconstructFailure>,
}

/// One-to-many profile search over a fixed network.
pub struct PatternSearch<'a> {
    network: &'a Network,
    config: SearchConfig,
}

impl<'a> PatternSearch<'a> {
    pub fn new(network: &'a Network, config: SearchConfig) -> Self {
        Self { network, config }
    }

    /// Compute the transfer patterns from `source` to every other stop.
    pub fn run(&self, source: StopId) -> Result<PatternSet, SearchError> {
        if !self.network.has_stop(source) {
            return Err(SearchError::UnknownStop(source));
        }

        let destinations: Vec<StopId> = self
            .network
            .stops()
            .iter()
            .copied()
            .filter(|&stop| stop != source)
            .collect();
        let last_legs = LastLegIndex::build(self.network, &destinations);

        let rounds = self.config.rounds();
        let mut labels = ParetoLabels::new(destinations.len(), rounds);
        let mut bounds = BoardingBounds::new(rounds);
        let mut queue = SegmentQueue::new(rounds);

        let departures = self.seed_departures(source);
        debug!(%source, departures = departures.len(), "starting profile sweep");

        let mut patterns: Vec<TransferPattern> = Vec::new();
        let mut seen: HashSet<TransferPattern> = HashSet::new();
        let mut failures: Vec<ReconstructFailure> = Vec::new();

        for departure in departures {
            queue.clear();
            self.enqueue(
                &[TransferEdge {
                    to_trip: departure.trip,
                    board_index: departure.stop_index,
                }],
                1,
                Predecessor::Source,
                &mut bounds,
                &mut queue,
            );

            // Rounds at which each destination's label improved under this
            // departure; those are the journeys to reconstruct afterwards.
            let mut reached: Vec<Vec<usize>> = vec![Vec::new(); destinations.len()];
            let mut active: Vec<usize> = (0..destinations.len()).collect();

            for n in 1..=rounds {
                let mut in_scope = vec![false; destinations.len()];
                let mut scope: Vec<usize> = Vec::new();

                for counter in 0..queue.round_len(n) {
                    let segment = queue.segment(n, counter);
                    let arrivals = self.network.trip_arrivals(segment.trip);

                    // Shortcut check: can this segment finish at an active
                    // destination?
                    for &d in &active {
                        for leg in last_legs.entries(d, segment.trip.route) {
                            if leg.index <= segment.from_index || leg.index >= segment.until_index {
                                continue;
                            }
                            let arrival = arrivals[leg.index] + leg.extra;
                            if arrival < labels.arrival(d, n) {
                                let walk = (!leg.extra.is_zero()).then_some(leg.stop);
                                labels.update(
                                    d,
                                    n,
                                    arrival,
                                    ReachedVia {
                                        trip: segment.trip,
                                        queue_index: counter,
                                        walk,
                                    },
                                );
                                reached[d].push(n);
                            }
                        }
                    }

                    // Transfer expansion.
                    if !self.network.has_transfers(segment.trip) {
                        continue;
                    }
                    if segment.until_index <= segment.from_index + 1 {
                        continue;
                    }
                    let next_arrival = arrivals[segment.from_index + 1];
                    let mut expand = false;
                    for &d in &active {
                        if next_arrival < labels.arrival(d, n) {
                            expand = true;
                            if !in_scope[d] {
                                in_scope[d] = true;
                                scope.push(d);
                            }
                        }
                    }
                    if !expand {
                        continue;
                    }

                    let mut edge_seen: HashSet<TransferEdge> = HashSet::new();
                    let mut connections: Vec<TransferEdge> = Vec::new();
                    for index in segment.from_index + 1..segment.until_index {
                        for &edge in self.network.transfers_from(segment.trip, index) {
                            if edge_seen.insert(edge) {
                                connections.push(edge);
                            }
                        }
                    }
                    self.enqueue(
                        &connections,
                        n + 1,
                        Predecessor::Transfer {
                            trip: segment.trip,
                            queue_index: counter,
                        },
                        &mut bounds,
                        &mut queue,
                    );
                }

                scope.sort_unstable();
                active = scope;
                if active.is_empty() {
                    break;
                }
            }

            for (d, rounds_hit) in reached.iter_mut().enumerate() {
                if rounds_hit.is_empty() {
                    continue;
                }
                rounds_hit.sort_unstable();
                rounds_hit.dedup();
                let dest = destinations[d];
                for &round in rounds_hit.iter().rev() {
                    match reconstruct_journey(
                        self.network,
                        &queue,
                        &labels,
                        source,
                        dest,
                        d,
                        round,
                    ) {
                        Ok(journey) => {
                            if self.config.trace_itineraries {
                                info!(
                                    %source,
                                    destination = %dest,
                                    itinerary = %journey.describe(),
                                    "reconstructed itinerary"
                                );
                            }
                            let pattern = journey.pattern();
                            if seen.insert(pattern.clone()) {
                                patterns.push(pattern);
                            }
                        }
                        Err(err) => {
                            error!(
                                %source,
                                destination = %dest,
                                transfers = round - 1,
                                %err,
                                "journey reconstruction failed"
                            );
                            failures.push(ReconstructFailure {
                                destination: dest,
                                transfers: round - 1,
                                reason: err.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(PatternSet {
            source,
            patterns,
            failures,
        })
    }

    /// All departures to seed, latest first.
    ///
    /// Sorting is total (time, then trip, then stop index) so a run's
    /// output does not depend on hash iteration order anywhere upstream.
    fn seed_departures(&self, source: StopId) -> Vec<Departure> {
        let mut departures = self.network.departures_at(source);
        if self.config.walk_from_source {
            for footpath in self.network.footpaths_from(source) {
                departures.extend(self.network.departures_at(footpath.to));
            }
        }
        departures.sort_by_key(|dep| {
            (
                std::cmp::Reverse(dep.time),
                dep.trip.route,
                dep.trip.seq,
                dep.stop_index,
            )
        });
        departures
    }

    /// Enqueue each connection that boards earlier than anything already
    /// queued for its trip at this round, and tighten the bounds for the
    /// trip and all later trips of its route.
    fn enqueue(
        &self,
        connections: &[TransferEdge],
        round: usize,
        pred: Predecessor,
        bounds: &mut BoardingBounds,
        queue: &mut SegmentQueue,
    ) {
        let rounds = self.config.rounds();
        for &edge in connections {
            let until_index = bounds.first_boarding(round, edge.to_trip);
            if edge.board_index >= until_index {
                continue;
            }
            let route_len = self.network.route_len(edge.to_trip.route);
            queue.push(
                round,
                TripSegment {
                    trip: edge.to_trip,
                    from_index: edge.board_index,
                    until_index: until_index.min(route_len),
                    pred,
                },
            );
            // A trip departing later on the same route can never overtake,
            // so the bound applies to it too, at this and all later rounds.
            let num_trips = self.network.num_trips(edge.to_trip.route) as u32;
            for seq in edge.to_trip.seq..num_trips {
                let later = TripId::new(edge.to_trip.route, seq);
                for r in round..=rounds {
                    bounds.tighten(r, later, edge.board_index);
                }
            }
        }
    }
}
