//! Journey legs and transfer patterns.
//!
//! A reconstructed journey is a chronological sequence of legs: rides on a
//! trip, and walks over footpaths. Its transfer pattern is the flattened,
//! deduplicated sequence of the stops where the rider boards, alights, or
//! walks, which is the artifact this crate exists to compute.

use std::fmt::Write as _;

use chrono::Duration;
use serde::Serialize;

use crate::network::{StopId, Time, TripId};

/// Error for a structurally invalid journey.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid journey: {0}")]
pub struct InvalidJourney(pub &'static str);

/// A vehicle leg: board `trip` at `board`, alight at `alight`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RideLeg {
    pub trip: TripId,
    pub board: StopId,
    pub alight: StopId,
    pub departs: Time,
    pub arrives: Time,
}

/// A walking leg over one footpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkLeg {
    pub from: StopId,
    pub to: StopId,
    pub duration: Duration,
    pub departs: Time,
    pub arrives: Time,
}

/// One leg of a journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    Ride(RideLeg),
    Walk(WalkLeg),
}

impl Leg {
    /// Stop where this leg begins.
    pub fn origin(&self) -> StopId {
        match self {
            Leg::Ride(ride) => ride.board,
            Leg::Walk(walk) => walk.from,
        }
    }

    /// Stop where this leg ends.
    pub fn destination(&self) -> StopId {
        match self {
            Leg::Ride(ride) => ride.alight,
            Leg::Walk(walk) => walk.to,
        }
    }

    /// Departure time of this leg.
    pub fn departs(&self) -> Time {
        match self {
            Leg::Ride(ride) => ride.departs,
            Leg::Walk(walk) => walk.departs,
        }
    }

    /// Arrival time of this leg.
    pub fn arrives(&self) -> Time {
        match self {
            Leg::Ride(ride) => ride.arrives,
            Leg::Walk(walk) => walk.arrives,
        }
    }

    /// Returns true if this is a vehicle leg.
    pub fn is_ride(&self) -> bool {
        matches!(self, Leg::Ride(_))
    }
}

/// A complete journey from one source stop to one destination stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Journey {
    legs: Vec<Leg>,
}

impl Journey {
    /// Assemble a journey from chronological legs.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the leg list is empty or contains no ride (a
    /// journey is never a pure walk here; footpath-only relations are not
    /// part of the search space).
    pub fn new(legs: Vec<Leg>) -> Result<Self, InvalidJourney> {
        if legs.is_empty() {
            return Err(InvalidJourney("journey has no legs"));
        }
        if !legs.iter().any(Leg::is_ride) {
            return Err(InvalidJourney("journey has no vehicle leg"));
        }
        Ok(Self { legs })
    }

    /// The legs in chronological order.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Departure time of the first leg.
    pub fn departure_time(&self) -> Time {
        self.legs[0].departs()
    }

    /// Arrival time of the last leg.
    pub fn arrival_time(&self) -> Time {
        self.legs[self.legs.len() - 1].arrives()
    }

    /// Number of vehicle-to-vehicle transfers.
    pub fn transfer_count(&self) -> usize {
        self.legs.iter().filter(|leg| leg.is_ride()).count() - 1
    }

    /// The transfer pattern of this journey.
    pub fn pattern(&self) -> TransferPattern {
        TransferPattern::from_legs(&self.legs)
    }

    /// Render a human-readable itinerary, one line per leg.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (i, leg) in self.legs.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            match leg {
                Leg::Ride(ride) => {
                    let _ = write!(
                        out,
                        "board trip {} at stop {} ({}) and alight at stop {} ({})",
                        ride.trip, ride.board, ride.departs, ride.alight, ride.arrives
                    );
                }
                Leg::Walk(walk) => {
                    let _ = write!(
                        out,
                        "walk {}s from stop {} to stop {}",
                        walk.duration.num_seconds(),
                        walk.from,
                        walk.to
                    );
                }
            }
        }
        out
    }
}

/// The ordered, deduplicated stop waypoints of one journey.
///
/// Stops are the board/alight/walk endpoints of the journey's legs, in
/// visiting order, with repeats removed (first occurrence kept).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TransferPattern(Vec<StopId>);

impl TransferPattern {
    /// Flatten leg endpoints into a pattern.
    pub fn from_legs(legs: &[Leg]) -> Self {
        let mut stops = Vec::with_capacity(legs.len() * 2);
        for leg in legs {
            for stop in [leg.origin(), leg.destination()] {
                if !stops.contains(&stop) {
                    stops.push(stop);
                }
            }
        }
        TransferPattern(stops)
    }

    /// The waypoint stops in visiting order.
    pub fn stops(&self) -> &[StopId] {
        &self.0
    }
}

impl From<Vec<StopId>> for TransferPattern {
    fn from(stops: Vec<StopId>) -> Self {
        TransferPattern(stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::RouteId;

    fn t(s: &str) -> Time {
        Time::parse(s).unwrap()
    }

    fn ride(trip: (u32, u32), board: u32, alight: u32, departs: &str, arrives: &str) -> Leg {
        Leg::Ride(RideLeg {
            trip: TripId::new(RouteId(trip.0), trip.1),
            board: StopId(board),
            alight: StopId(alight),
            departs: t(departs),
            arrives: t(arrives),
        })
    }

    fn walk(from: u32, to: u32, seconds: i64, departs: &str) -> Leg {
        let departs = t(departs);
        Leg::Walk(WalkLeg {
            from: StopId(from),
            to: StopId(to),
            duration: Duration::seconds(seconds),
            departs,
            arrives: departs + Duration::seconds(seconds),
        })
    }

    #[test]
    fn journey_accessors() {
        let journey = Journey::new(vec![
            ride((0, 0), 0, 1, "08:00:00", "08:10:00"),
            walk(1, 2, 60, "08:10:00"),
            ride((1, 0), 2, 3, "08:15:00", "08:30:00"),
        ])
        .unwrap();

        assert_eq!(journey.departure_time(), t("08:00:00"));
        assert_eq!(journey.arrival_time(), t("08:30:00"));
        assert_eq!(journey.transfer_count(), 1);
        assert_eq!(journey.legs().len(), 3);
    }

    #[test]
    fn rejects_empty_and_walk_only() {
        assert!(Journey::new(vec![]).is_err());
        assert!(Journey::new(vec![walk(0, 1, 60, "08:00:00")]).is_err());
    }

    #[test]
    fn pattern_flattens_and_dedups() {
        let journey = Journey::new(vec![
            ride((0, 0), 0, 1, "08:00:00", "08:10:00"),
            // Transfer at the same stop: endpoints repeat.
            ride((1, 0), 1, 4, "08:15:00", "08:30:00"),
            walk(4, 7, 120, "08:30:00"),
        ])
        .unwrap();

        assert_eq!(
            journey.pattern().stops(),
            &[StopId(0), StopId(1), StopId(4), StopId(7)]
        );
    }

    #[test]
    fn pattern_dedup_keeps_first_occurrence() {
        let pattern = TransferPattern::from_legs(&[
            ride((0, 0), 3, 5, "08:00:00", "08:10:00"),
            walk(5, 3, 60, "08:10:00"),
        ]);
        assert_eq!(pattern.stops(), &[StopId(3), StopId(5)]);
    }

    #[test]
    fn describe_lists_each_leg() {
        let journey = Journey::new(vec![
            ride((0, 0), 0, 1, "08:00:00", "08:10:00"),
            walk(1, 2, 60, "08:10:00"),
        ])
        .unwrap();

        let text = journey.describe();
        assert!(text.contains("board trip 0_0 at stop 0 (08:00:00)"));
        assert!(text.contains("walk 60s from stop 1 to stop 2"));
    }
}
