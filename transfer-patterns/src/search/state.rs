//! Mutable search state for one source run.
//!
//! Three structures drive the round engine:
//!
//! - [`ParetoLabels`]: per (destination, round), the best known arrival
//!   time and the predecessor needed to rebuild the journey;
//! - [`BoardingBounds`]: per (round, trip), the earliest boarding index
//!   already enqueued, which is the dominance rule;
//! - [`SegmentQueue`]: per round, the append-only list of trip segments,
//!   whose typed predecessor links are the sole backtracking mechanism.
//!
//! Labels and bounds persist across the whole descending departure sweep;
//! the queue is reset per departure.

use std::collections::HashMap;

use crate::network::{StopId, Time, TripId};

/// Predecessor link of a trip segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predecessor {
    /// Round-1 seed boarded directly at (or one footpath from) the source.
    Source,
    /// Reached by transferring out of `trip`, which sits at `queue_index`
    /// in the previous round's queue.
    Transfer { trip: TripId, queue_index: usize },
}

/// A continuation of one trip from a boarding index onward.
///
/// `until_index` is the exclusive scan bound: the earliest boarding index
/// recorded for this trip when the segment was created. Stops at or past
/// it were already covered by a dominating segment.
#[derive(Debug, Clone, Copy)]
pub struct TripSegment {
    pub trip: TripId,
    pub from_index: usize,
    pub until_index: usize,
    pub pred: Predecessor,
}

/// How a destination label was reached, for backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachedVia {
    /// The trip whose scan improved the label.
    pub trip: TripId,
    /// Index of that trip's segment in its round's queue.
    pub queue_index: usize,
    /// When the journey ends with a footpath, the stop it starts from.
    pub walk: Option<StopId>,
}

/// Best known arrival at one (destination, round).
#[derive(Debug, Clone, Copy)]
pub struct Label {
    pub arrival: Time,
    pub via: Option<ReachedVia>,
}

/// Pareto label store: per destination, per round, the best arrival.
///
/// Rounds are 1-based; round `r` covers journeys with `r - 1` transfers.
/// Invariant: for a fixed destination, arrival times are non-increasing in
/// the round, since more transfers can only help or tie.
/// [`ParetoLabels::update`] maintains this by propagating every improvement
/// to all later rounds.
pub struct ParetoLabels {
    rounds: usize,
    /// `labels[dest][round]`; index 0 is unused.
    labels: Vec<Vec<Label>>,
}

impl ParetoLabels {
    pub fn new(num_destinations: usize, rounds: usize) -> Self {
        let unreached = Label {
            arrival: Time::NEVER,
            via: None,
        };
        Self {
            rounds,
            labels: vec![vec![unreached; rounds + 1]; num_destinations],
        }
    }

    /// Best known arrival at `dest` using at most `round - 1` transfers.
    pub fn arrival(&self, dest: usize, round: usize) -> Time {
        self.labels[dest][round].arrival
    }

    /// Predecessor of the label at (`dest`, `round`).
    pub fn via(&self, dest: usize, round: usize) -> Option<ReachedVia> {
        self.labels[dest][round].via
    }

    /// Record a strictly improving arrival at (`dest`, `round`).
    ///
    /// The predecessor is written at `round`; the arrival time also
    /// overwrites every later round it improves.
    pub fn update(&mut self, dest: usize, round: usize, arrival: Time, via: ReachedVia) {
        debug_assert!(arrival < self.labels[dest][round].arrival);
        self.labels[dest][round].via = Some(via);
        for r in round..=self.rounds {
            if arrival < self.labels[dest][r].arrival {
                self.labels[dest][r].arrival = arrival;
            }
        }
    }
}

/// Sentinel boarding index: "beyond the end of any route".
pub const UNBOARDED: usize = usize::MAX;

/// Dominance table: per round, per trip, the earliest boarding index
/// already enqueued.
///
/// Entries only ever decrease. A candidate segment is worth enqueueing
/// only if it boards strictly earlier than the recorded index.
pub struct BoardingBounds {
    by_round: Vec<HashMap<TripId, usize>>,
}

impl BoardingBounds {
    /// Create bounds for `rounds` propagation rounds (plus the overflow
    /// round that enqueueing from the last round may touch).
    pub fn new(rounds: usize) -> Self {
        Self {
            by_round: vec![HashMap::new(); rounds + 2],
        }
    }

    /// Earliest boarding index recorded for `trip` at `round`, or
    /// [`UNBOARDED`].
    pub fn first_boarding(&self, round: usize, trip: TripId) -> usize {
        self.by_round[round].get(&trip).copied().unwrap_or(UNBOARDED)
    }

    /// Lower the recorded index for `trip` at `round` to `index` if it
    /// improves it.
    pub fn tighten(&mut self, round: usize, trip: TripId, index: usize) {
        let entry = self.by_round[round].entry(trip).or_insert(UNBOARDED);
        if index < *entry {
            *entry = index;
        }
    }
}

/// Per-round, append-only queue of trip segments.
pub struct SegmentQueue {
    rounds: Vec<Vec<TripSegment>>,
}

impl SegmentQueue {
    /// Create a queue for `rounds` propagation rounds plus the overflow
    /// round.
    pub fn new(rounds: usize) -> Self {
        Self {
            rounds: vec![Vec::new(); rounds + 2],
        }
    }

    /// Drop all segments; called once per departure.
    pub fn clear(&mut self) {
        for round in &mut self.rounds {
            round.clear();
        }
    }

    /// Append a segment to a round, returning its queue index.
    pub fn push(&mut self, round: usize, segment: TripSegment) -> usize {
        let queue = &mut self.rounds[round];
        queue.push(segment);
        queue.len() - 1
    }

    /// Number of segments queued in a round.
    pub fn round_len(&self, round: usize) -> usize {
        self.rounds[round].len()
    }

    /// Copy out the segment at (`round`, `index`).
    ///
    /// # Panics
    ///
    /// Panics if the index is out of range; the engine only indexes within
    /// `round_len`.
    pub fn segment(&self, round: usize, index: usize) -> TripSegment {
        self.rounds[round][index]
    }

    /// The segment at (`round`, `index`), if present. Used by the
    /// reconstructor, where a miss is an invariant violation to surface
    /// rather than a panic.
    pub fn get(&self, round: usize, index: usize) -> Option<&TripSegment> {
        self.rounds.get(round).and_then(|q| q.get(index))
    }
}
