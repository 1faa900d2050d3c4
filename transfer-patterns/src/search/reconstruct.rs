//! Backward journey reconstruction.
//!
//! A destination label carries only its final trip segment and queue
//! position; everything earlier is recovered by following predecessor
//! links back through the per-round queues to the source seed, then
//! replaying the chain forward into legs.
//!
//! Every lookup failure here is an engine invariant violation, not a
//! property of the network, so each gets its own error variant instead of
//! a panic: the batch driver records the failure and moves on.

use crate::journey::{InvalidJourney, Journey, Leg, RideLeg, WalkLeg};
use crate::network::{Network, RouteId, StopId, Time, TripId};

use super::state::{ParetoLabels, Predecessor, SegmentQueue, TripSegment};

/// Error rebuilding a journey from search state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconstructError {
    #[error("no label recorded at round {round}")]
    MissingLabel { round: usize },

    #[error("queue has no segment at round {round}, index {index}")]
    MissingSegment { round: usize, index: usize },

    #[error("predecessor chain does not end at a source seed")]
    BadSeed,

    #[error("no transfer from trip {from} reaches trip {to} at index {index}")]
    UnmatchedTransfer {
        from: TripId,
        to: TripId,
        index: usize,
    },

    #[error("no footpath between stop {from} and stop {to}")]
    MissingFootpath { from: StopId, to: StopId },

    #[error("no footpath links the source to first boarding stop {stop}")]
    DisconnectedSource { stop: StopId },

    #[error("stop {stop} is not on route {route}")]
    StopNotOnRoute { stop: StopId, route: RouteId },

    #[error("index {index} is out of range on route {route}")]
    IndexOutOfRange { route: RouteId, index: usize },

    #[error("rebuilt journey arrives at {got}, label says {want}")]
    ArrivalMismatch { got: Time, want: Time },

    #[error(transparent)]
    InvalidJourney(#[from] InvalidJourney),
}

/// Rebuild the journey behind the label at (`dest_index`, `round`).
pub(crate) fn reconstruct_journey(
    network: &Network,
    queue: &SegmentQueue,
    labels: &ParetoLabels,
    source: StopId,
    dest: StopId,
    dest_index: usize,
    round: usize,
) -> Result<Journey, ReconstructError> {
    let via = labels
        .via(dest_index, round)
        .ok_or(ReconstructError::MissingLabel { round })?;

    // Follow predecessor links from the final segment back to the seed.
    let mut chain: Vec<TripSegment> = Vec::with_capacity(round);
    let mut index = via.queue_index;
    for r in (1..=round).rev() {
        let segment = *queue
            .get(r, index)
            .ok_or(ReconstructError::MissingSegment { round: r, index })?;
        chain.push(segment);
        match (r, segment.pred) {
            (1, Predecessor::Source) => {}
            (_, Predecessor::Transfer { queue_index, .. }) if r > 1 => index = queue_index,
            _ => return Err(ReconstructError::BadSeed),
        }
    }
    chain.reverse();

    // Resolve where each segment alights. Between segments this is the
    // transfer edge that produced the next boarding; the final segment
    // alights at the destination or the footpath's near end.
    let mut alight_indices = Vec::with_capacity(chain.len());
    for pair in chain.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let route_len = network.route_len(current.trip.route);
        let mut found = None;
        for f in current.from_index..route_len {
            let matches = network.transfers_from(current.trip, f).iter().any(|edge| {
                edge.to_trip == next.trip && edge.board_index == next.from_index
            });
            if matches {
                found = Some(f);
            }
        }
        alight_indices.push(found.ok_or(ReconstructError::UnmatchedTransfer {
            from: current.trip,
            to: next.trip,
            index: next.from_index,
        })?);
    }
    let last = chain[chain.len() - 1];
    let final_stop = via.walk.unwrap_or(dest);
    alight_indices.push(network.stop_index(last.trip.route, final_stop).ok_or(
        ReconstructError::StopNotOnRoute {
            stop: final_stop,
            route: last.trip.route,
        },
    )?);

    let stop_at = |trip: TripId, index: usize| {
        network
            .stops_of(trip.route)
            .get(index)
            .copied()
            .ok_or(ReconstructError::IndexOutOfRange {
                route: trip.route,
                index,
            })
    };
    let time_at = |trip: TripId, index: usize| {
        network
            .trip_arrivals(trip)
            .get(index)
            .copied()
            .ok_or(ReconstructError::IndexOutOfRange {
                route: trip.route,
                index,
            })
    };

    let mut legs = Vec::with_capacity(chain.len() * 2);

    // Seeds boarded one footpath from the source get a leading walk.
    let first_board = stop_at(chain[0].trip, chain[0].from_index)?;
    if first_board != source {
        let duration = network
            .footpath_duration(source, first_board)
            .ok_or(ReconstructError::DisconnectedSource { stop: first_board })?;
        let arrives = time_at(chain[0].trip, chain[0].from_index)?;
        legs.push(Leg::Walk(WalkLeg {
            from: source,
            to: first_board,
            duration,
            departs: arrives - duration,
            arrives,
        }));
    }

    for (i, (segment, &alight_index)) in chain.iter().zip(&alight_indices).enumerate() {
        let board = stop_at(segment.trip, segment.from_index)?;
        let alight = stop_at(segment.trip, alight_index)?;
        let arrives = time_at(segment.trip, alight_index)?;
        legs.push(Leg::Ride(RideLeg {
            trip: segment.trip,
            board,
            alight,
            departs: time_at(segment.trip, segment.from_index)?,
            arrives,
        }));

        // Transfers over a footpath become an explicit walking leg.
        if let Some(next) = chain.get(i + 1) {
            let next_board = stop_at(next.trip, next.from_index)?;
            if next_board != alight {
                let duration = network.footpath_duration(alight, next_board).ok_or(
                    ReconstructError::MissingFootpath {
                        from: alight,
                        to: next_board,
                    },
                )?;
                legs.push(Leg::Walk(WalkLeg {
                    from: alight,
                    to: next_board,
                    duration,
                    departs: arrives,
                    arrives: arrives + duration,
                }));
            }
        }
    }

    if let Some(walk_from) = via.walk {
        let duration = network.footpath_duration(walk_from, dest).ok_or(
            ReconstructError::MissingFootpath {
                from: walk_from,
                to: dest,
            },
        )?;
        let departs = legs[legs.len() - 1].arrives();
        legs.push(Leg::Walk(WalkLeg {
            from: walk_from,
            to: dest,
            duration,
            departs,
            arrives: departs + duration,
        }));
    }

    let journey = Journey::new(legs)?;
    let want = labels.arrival(dest_index, round);
    if journey.arrival_time() != want {
        return Err(ReconstructError::ArrivalMismatch {
            got: journey.arrival_time(),
            want,
        });
    }
    Ok(journey)
}
