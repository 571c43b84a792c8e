//! Derived per-agent health state and transitions.

use crate::agent::domain::{AgentId, HealthStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Liveness state of one agent, derived from its record and heartbeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthState {
    status: HealthStatus,
    last_heartbeat: Option<DateTime<Utc>>,
    observed_since: DateTime<Utc>,
    consecutive_misses: u32,
}

impl HealthState {
    /// Creates an `unknown` state for an agent first seen at `observed_since`.
    #[must_use]
    pub const fn new(observed_since: DateTime<Utc>) -> Self {
        Self {
            status: HealthStatus::Unknown,
            last_heartbeat: None,
            observed_since,
            consecutive_misses: 0,
        }
    }

    /// Rebuilds state from the fields stored on an agent record.
    #[must_use]
    pub const fn restored(
        status: HealthStatus,
        last_heartbeat: Option<DateTime<Utc>>,
        observed_since: DateTime<Utc>,
    ) -> Self {
        Self {
            status,
            last_heartbeat,
            observed_since,
            consecutive_misses: 0,
        }
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> HealthStatus {
        self.status
    }

    /// Returns the last observed heartbeat.
    #[must_use]
    pub const fn last_heartbeat(&self) -> Option<DateTime<Utc>> {
        self.last_heartbeat
    }

    /// Returns when tracking started.
    #[must_use]
    pub const fn observed_since(&self) -> DateTime<Utc> {
        self.observed_since
    }

    /// Returns how many consecutive sweeps found the agent stale.
    #[must_use]
    pub const fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    /// Instant staleness is measured from.
    #[must_use]
    pub fn liveness_reference(&self) -> DateTime<Utc> {
        self.last_heartbeat.unwrap_or(self.observed_since)
    }

    pub(crate) fn record_heartbeat(&mut self, status: HealthStatus, at: DateTime<Utc>) {
        self.status = status;
        self.last_heartbeat = Some(self.last_heartbeat.map_or(at, |previous| previous.max(at)));
        self.consecutive_misses = 0;
    }

    pub(crate) const fn set_status(&mut self, status: HealthStatus) {
        self.status = status;
    }

    pub(crate) const fn record_miss(&mut self) {
        self.consecutive_misses = self.consecutive_misses.saturating_add(1);
    }
}

/// Status transition of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthChange {
    /// Affected agent.
    pub agent_id: AgentId,
    /// Status before the transition.
    pub previous: HealthStatus,
    /// Status after the transition.
    pub current: HealthStatus,
    /// When the transition was observed.
    pub at: DateTime<Utc>,
}

/// Result of applying a heartbeat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeartbeatOutcome {
    /// Heartbeat instant after clamping to the monitor clock.
    pub observed_at: DateTime<Utc>,
    /// Transition caused by the heartbeat, if the status changed.
    pub change: Option<HealthChange>,
}

/// Number of tracked agents per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCounts {
    /// Agents currently healthy.
    pub healthy: usize,
    /// Agents currently unhealthy.
    pub unhealthy: usize,
    /// Agents that have not reported yet.
    pub unknown: usize,
}
