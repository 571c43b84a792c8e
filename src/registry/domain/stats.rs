//! Registry-wide and per-agent counters.

use crate::agent::domain::{AgentId, AgentRecord, HealthStatus, Protocol};
use crate::discovery::domain::{IndexStats, MatchedField};
use crate::health::domain::HealthCounts;
use crate::trust::domain::TrustScore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Invocation counters of one agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationMetrics {
    /// Invocations that reached a definite outcome.
    pub invocations: u64,
    /// Invocations that failed remotely, timed out or were unreachable.
    pub errors: u64,
    /// Sum of observed latencies in milliseconds.
    pub latency_sum_ms: u64,
    /// Number of latency samples.
    pub latency_count: u64,
}

impl InvocationMetrics {
    /// Records one outcome.
    pub const fn record(&mut self, latency_ms: u64, failed: bool) {
        self.invocations = self.invocations.saturating_add(1);
        if failed {
            self.errors = self.errors.saturating_add(1);
        }
        self.latency_sum_ms = self.latency_sum_ms.saturating_add(latency_ms);
        self.latency_count = self.latency_count.saturating_add(1);
    }

    /// Mean latency in whole milliseconds, if any sample exists.
    #[must_use]
    pub const fn mean_latency_ms(&self) -> Option<u64> {
        self.latency_sum_ms.checked_div(self.latency_count)
    }
}

/// Registry-wide counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Registered agents.
    pub total_agents: usize,
    /// Agents per live health status.
    pub health: HealthCounts,
    /// Agents per protocol.
    pub protocols: BTreeMap<Protocol, usize>,
    /// Writes waiting for storage to come back.
    pub pending_writes: usize,
    /// Whether the last storage read failed.
    pub degraded: bool,
    /// Discovery index sizes.
    pub index: IndexStats,
}

/// Invocation metrics and trust breakdown of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Agent the counters belong to.
    pub agent_id: AgentId,
    /// Live health status.
    pub health: HealthStatus,
    /// Sweeps in a row that found the agent silent.
    pub consecutive_misses: u32,
    /// Invocation counters.
    pub metrics: InvocationMetrics,
    /// Current trust score.
    pub trust: Option<TrustScore>,
}

/// Ranked free-text match with the full record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Matching agent.
    pub record: AgentRecord,
    /// Relevance score.
    pub score: f64,
    /// Fields that contributed to the score.
    pub matched_fields: Vec<MatchedField>,
}

/// Outcome of one convergence pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    /// Queued writes that reached storage.
    pub flushed: usize,
    /// Queued writes still waiting.
    pub still_pending: usize,
    /// Records first seen in storage.
    pub added: usize,
    /// Local records replaced by newer stored copies.
    pub updated: usize,
    /// Local records dropped because storage no longer has them.
    pub removed: usize,
}
