//! Network identifiers.
//!
//! Stops and routes carry the integer identifiers assigned by the
//! preprocessor. A trip is identified by its route and its position in the
//! route's timetable; `TripId` replaces the preprocessor's
//! `"route_tripindex"` string keys with a composite key that hashes and
//! compares natively.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a stop in the network.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u32);

impl fmt::Debug for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StopId({})", self.0)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a route (a physical stop pattern with a timetable).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteId(pub u32);

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a trip: a route and an index into its timetable.
///
/// Trips on a route are sorted so that trip `k` never overtakes trip
/// `k - 1` at any shared stop (the FIFO property, assumed but not verified).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TripId {
    pub route: RouteId,
    pub seq: u32,
}

impl TripId {
    /// Create a trip id from a route and a timetable position.
    pub fn new(route: RouteId, seq: u32) -> Self {
        Self { route, seq }
    }
}

impl fmt::Debug for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TripId({}_{})", self.route, self.seq)
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.route, self.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(StopId(17).to_string(), "17");
        assert_eq!(RouteId(4).to_string(), "4");
        assert_eq!(TripId::new(RouteId(4), 2).to_string(), "4_2");
    }

    #[test]
    fn trip_ordering_is_route_then_seq() {
        let a = TripId::new(RouteId(1), 9);
        let b = TripId::new(RouteId(2), 0);
        let c = TripId::new(RouteId(2), 1);
        assert!(a < b);
        assert!(b < c);
    }
}
