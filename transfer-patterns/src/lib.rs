//! Offline precomputation of transfer patterns for a transit network.
//!
//! A transfer pattern is the ordered list of stops where an optimal
//! journey boards, alights, or walks. Precomputing the patterns from every
//! stop reduces later query-time routing to a lookup over a small set of
//! candidate stop sequences.
//!
//! The crate splits into static network indices ([`network`]), the
//! per-source profile search ([`search`]), journey and pattern types
//! ([`journey`]), and the parallel batch driver ([`driver`]) that fans the
//! search out over every stop and writes one pattern file per source.

pub mod driver;
pub mod journey;
pub mod network;
pub mod search;
