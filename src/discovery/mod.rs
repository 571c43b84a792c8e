//! Capability discovery over registered agents.
//!
//! The service keeps skill, protocol and tag buckets plus a token index over
//! names, tags, skill names and descriptions. It holds derived state only
//! and never talks to storage.
//!
//! - Domain types in [`domain`]
//! - The [`ports::RankingSignals`] contract in [`ports`]
//! - The [`services::DiscoveryService`] in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
