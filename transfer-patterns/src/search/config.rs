//! Search configuration.

/// Parameters for one pattern-precomputation run.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of vehicle-to-vehicle transfers per journey.
    pub max_transfers: usize,

    /// Also seed departures reachable by one footpath from the source.
    pub walk_from_source: bool,

    /// Log every reconstructed itinerary in human-readable form.
    pub trace_itineraries: bool,
}

impl SearchConfig {
    /// Number of propagation rounds; round `r` covers journeys with
    /// `r - 1` transfers.
    pub fn rounds(&self) -> usize {
        self.max_transfers + 1
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_transfers: 3,
            walk_from_source: false,
            trace_itineraries: false,
        }
    }
}
