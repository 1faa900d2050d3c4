//! Static network indices consumed by the search core.
//!
//! Everything here is immutable for the duration of a batch run: routes
//! and their stop sequences, trip timetables, footpaths, the
//! (route, stop) → index lookup, and the precomputed trip-to-trip transfer
//! graph. The search core only ever reads these indices, which is what
//! makes per-source computations freely parallelizable.

mod ids;
mod load;
mod model;
mod time;

pub use ids::{RouteId, StopId, TripId};
pub use load::{LoadError, load_network};
pub use model::{Departure, Footpath, Network, NetworkBuilder, NetworkError, TransferEdge};
pub use time::{Time, TimeError};
