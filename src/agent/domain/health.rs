//! Agent health status.

use super::ParseHealthStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Liveness status of a registered agent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// No heartbeat has been observed yet.
    #[default]
    Unknown,
    /// The agent reported itself healthy recently.
    Healthy,
    /// The agent reported a problem or went stale.
    Unhealthy,
}

impl HealthStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Healthy => "healthy",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HealthStatus {
    type Error = ParseHealthStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "unknown" => Ok(Self::Unknown),
            "healthy" => Ok(Self::Healthy),
            "unhealthy" => Ok(Self::Unhealthy),
            _ => Err(ParseHealthStatusError(value.to_owned())),
        }
    }
}
