//! Liveness tracking services.

mod monitor;

pub use monitor::HealthMonitor;
