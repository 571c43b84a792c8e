//! Ranking signals read from the registry's live state.

use crate::agent::domain::AgentId;
use crate::discovery::ports::RankingSignals;
use crate::health::services::HealthMonitor;
use crate::registry::domain::InvocationMetrics;
use crate::trust::services::TrustManager;
use dashmap::DashMap;
use mockable::Clock;

/// Borrowed view over health, trust and metrics for one query.
pub(super) struct RegistrySignals<'a, C>
where
    C: Clock + Send + Sync,
{
    pub(super) health: &'a HealthMonitor<C>,
    pub(super) trust: &'a TrustManager<C>,
    pub(super) metrics: &'a DashMap<AgentId, InvocationMetrics>,
}

impl<C> RankingSignals for RegistrySignals<'_, C>
where
    C: Clock + Send + Sync,
{
    fn is_healthy(&self, id: &AgentId) -> bool {
        self.health.is_healthy(id)
    }

    fn trust_score(&self, id: &AgentId) -> f64 {
        self.trust.score_value(id)
    }

    fn invocations(&self, id: &AgentId) -> u64 {
        self.metrics.get(id).map_or(0, |entry| entry.invocations)
    }
}
