//! The profile search core.
//!
//! [`PatternSearch`] runs the one-to-many round engine from a single
//! source stop: seed every departure in descending time order, propagate
//! trip segments round by round under boarding-index dominance, check each
//! segment against the destination reachability table, and reconstruct a
//! journey for every label the sweep improves. The deduplicated patterns
//! of those journeys are the result.

mod config;
mod engine;
mod reachability;
mod reconstruct;
mod state;

pub use config::SearchConfig;
pub use engine::{PatternSearch, PatternSet, ReconstructFailure, SearchError};
pub use reconstruct::ReconstructError;
