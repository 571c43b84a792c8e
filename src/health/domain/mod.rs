//! Domain model for agent liveness tracking.

mod config;
mod state;

pub use config::HealthConfig;
pub use state::{HealthChange, HealthCounts, HealthState, HeartbeatOutcome};
