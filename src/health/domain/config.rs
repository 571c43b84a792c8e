//! Liveness tracking configuration.

use std::time::Duration;

/// Sweep cadence and staleness threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthConfig {
    /// Period of the background staleness sweep.
    pub sweep_interval: Duration,
    /// Silence after which an agent is considered unhealthy.
    pub staleness_threshold: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(30),
            staleness_threshold: Duration::from_secs(300),
        }
    }
}
