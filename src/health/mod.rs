//! Agent liveness tracking from heartbeats and periodic sweeps.
//!
//! - Domain types in [`domain`]
//! - The [`services::HealthMonitor`] service in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
