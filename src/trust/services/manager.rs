//! Trust scoring service.
//!
//! Provides [`TrustManager`], which keeps one ledger per agent and applies
//! trust events in arrival order.

use super::ledger::{NEUTRAL, TrustLedger};
use crate::agent::domain::{AgentId, HealthStatus};
use crate::trust::domain::{
    ScoreChange, TrustConfig, TrustConfigError, TrustEvent, TrustEventKind, TrustScore,
};
use dashmap::DashMap;
use mockable::Clock;
use std::sync::Arc;
use tracing::debug;

/// Per-agent trust scoring engine.
///
/// Each agent's ledger lives in its own map entry, so event application is
/// serialized per agent while unrelated agents proceed independently. Reads
/// never suspend.
pub struct TrustManager<C>
where
    C: Clock + Send + Sync,
{
    config: TrustConfig,
    ledgers: DashMap<AgentId, TrustLedger>,
    clock: Arc<C>,
}

impl<C> TrustManager<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a trust manager.
    ///
    /// # Errors
    ///
    /// Returns [`TrustConfigError`] when `config` fails validation.
    pub fn new(config: TrustConfig, clock: Arc<C>) -> Result<Self, TrustConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ledgers: DashMap::new(),
            clock,
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &TrustConfig {
        &self.config
    }

    /// Starts tracking an agent at the neutral score. Tracking an agent twice
    /// keeps the existing ledger.
    pub fn track(&self, id: &AgentId) {
        let now = self.clock.utc();
        self.ledgers
            .entry(id.clone())
            .or_insert_with(|| TrustLedger::new(now));
    }

    /// Stops tracking an agent and drops its history.
    pub fn remove(&self, id: &AgentId) -> bool {
        self.ledgers.remove(id).is_some()
    }

    /// Applies one trust event, tracking the agent first when needed.
    ///
    /// `magnitude` carries the observed latency in milliseconds for
    /// `success` and `failure`, and an optional decay fraction for `decay`.
    /// Returns the appended event, or `None` when a decay step left the score
    /// effectively unchanged.
    pub fn apply(
        &self,
        id: &AgentId,
        kind: TrustEventKind,
        magnitude: Option<f64>,
    ) -> Option<TrustEvent> {
        let now = self.clock.utc();
        let mut ledger = self
            .ledgers
            .entry(id.clone())
            .or_insert_with(|| TrustLedger::new(now));
        let event = ledger.apply(kind, magnitude, now, &self.config);
        if let Some(applied) = event {
            debug!(
                agent_id = %id,
                kind = %kind,
                delta = applied.delta(),
                score = applied.score(),
                "trust event applied"
            );
        }
        event
    }

    /// Feeds a health transition into the unhealthy penalty.
    ///
    /// Returns the score movement when the penalty toggled the composite.
    pub fn observe_health(&self, id: &AgentId, status: HealthStatus) -> Option<ScoreChange> {
        let now = self.clock.utc();
        let mut ledger = self.ledgers.get_mut(id)?;
        let previous = ledger.set_unhealthy(status == HealthStatus::Unhealthy, now, &self.config)?;
        Some(ScoreChange {
            agent_id: id.clone(),
            previous,
            current: ledger.score(),
        })
    }

    /// Applies one decay step to every agent idle for longer than the decay
    /// window, returning the events that moved a score.
    pub fn decay_idle(&self) -> Vec<(AgentId, TrustEvent)> {
        let now = self.clock.utc();
        let mut applied = Vec::new();
        for mut entry in self.ledgers.iter_mut() {
            if !entry.is_idle(now, self.config.decay_window) {
                continue;
            }
            if let Some(event) = entry.apply(TrustEventKind::Decay, None, now, &self.config) {
                applied.push((entry.key().clone(), event));
            }
        }
        if !applied.is_empty() {
            debug!(agents = applied.len(), "decayed idle trust scores");
        }
        applied
    }

    /// Returns the current score and breakdown of a tracked agent.
    #[must_use]
    pub fn score(&self, id: &AgentId) -> Option<TrustScore> {
        self.ledgers.get(id).map(|ledger| ledger.snapshot())
    }

    /// Returns the composite score, or the neutral baseline when untracked.
    #[must_use]
    pub fn score_value(&self, id: &AgentId) -> f64 {
        self.ledgers.get(id).map_or(NEUTRAL, |ledger| ledger.score())
    }

    /// Returns up to `limit` most recent events, oldest first.
    #[must_use]
    pub fn history(&self, id: &AgentId, limit: usize) -> Vec<TrustEvent> {
        self.ledgers
            .get(id)
            .map(|ledger| ledger.history(limit))
            .unwrap_or_default()
    }

    /// Returns the number of tracked agents.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.ledgers.len()
    }
}
