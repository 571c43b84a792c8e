//! Port contracts for the discovery service.

mod signals;

pub use signals::RankingSignals;
