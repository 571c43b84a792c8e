//! Liveness tracking service.
//!
//! Provides [`HealthMonitor`], which applies heartbeats, runs staleness
//! sweeps and notifies subscribers of status transitions.

use crate::agent::domain::{AgentId, HealthStatus};
use crate::health::domain::{
    HealthChange, HealthConfig, HealthCounts, HealthState, HeartbeatOutcome,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const NOTIFICATION_CAPACITY: usize = 256;

/// Per-agent liveness tracker.
///
/// State is derived from agent records and can be rebuilt at any time with
/// [`HealthMonitor::restore`]. Heartbeats and sweeps lock one agent entry at
/// a time, so they exclude each other per agent without blocking unrelated
/// agents.
pub struct HealthMonitor<C>
where
    C: Clock + Send + Sync,
{
    config: HealthConfig,
    states: DashMap<AgentId, HealthState>,
    notifier: broadcast::Sender<HealthChange>,
    clock: Arc<C>,
}

impl<C> HealthMonitor<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a monitor with no tracked agents.
    #[must_use]
    pub fn new(config: HealthConfig, clock: Arc<C>) -> Self {
        let (notifier, _receiver) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            config,
            states: DashMap::new(),
            notifier,
            clock,
        }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &HealthConfig {
        &self.config
    }

    /// Subscribes to status transitions observed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HealthChange> {
        self.notifier.subscribe()
    }

    /// Starts tracking a newly registered agent as `unknown`. Existing state
    /// is kept.
    pub fn track(&self, id: &AgentId, observed_since: DateTime<Utc>) {
        self.states
            .entry(id.clone())
            .or_insert_with(|| HealthState::new(observed_since));
    }

    /// Replaces the tracked state with values read from an agent record.
    pub fn restore(
        &self,
        id: &AgentId,
        status: HealthStatus,
        last_heartbeat: Option<DateTime<Utc>>,
        observed_since: DateTime<Utc>,
    ) {
        self.states.insert(
            id.clone(),
            HealthState::restored(status, last_heartbeat, observed_since),
        );
    }

    /// Stops tracking an agent.
    pub fn remove(&self, id: &AgentId) -> bool {
        self.states.remove(id).is_some()
    }

    /// Drops every tracked agent.
    pub fn clear(&self) {
        self.states.clear();
    }

    /// Applies a heartbeat reported at `at`, or now when absent.
    ///
    /// Timestamps ahead of the monitor clock are clamped to the clock so a
    /// drifting agent cannot postpone its own staleness.
    pub fn heartbeat(
        &self,
        id: &AgentId,
        status: HealthStatus,
        at: Option<DateTime<Utc>>,
    ) -> HeartbeatOutcome {
        let now = self.clock.utc();
        let observed_at = at.map_or(now, |reported| reported.min(now));
        let change = {
            let mut state = self
                .states
                .entry(id.clone())
                .or_insert_with(|| HealthState::new(now));
            let previous = state.status();
            state.record_heartbeat(status, observed_at);
            (previous != status).then(|| HealthChange {
                agent_id: id.clone(),
                previous,
                current: status,
                at: now,
            })
        };

        if let Some(transition) = &change {
            self.notify(transition);
        }
        HeartbeatOutcome {
            observed_at,
            change,
        }
    }

    /// Sets a status directly, without counting as a heartbeat.
    pub fn set_status(&self, id: &AgentId, status: HealthStatus) -> Option<HealthChange> {
        let now = self.clock.utc();
        let change = {
            let mut state = self.states.get_mut(id)?;
            let previous = state.status();
            state.set_status(status);
            (previous != status).then(|| HealthChange {
                agent_id: id.clone(),
                previous,
                current: status,
                at: now,
            })
        };
        if let Some(transition) = &change {
            self.notify(transition);
        }
        change
    }

    /// Marks every agent silent for longer than the staleness threshold as
    /// unhealthy.
    ///
    /// Only the first sweep of a staleness episode reports a transition;
    /// later sweeps increment the miss counter silently. Running the sweep
    /// late or twice in a row is harmless.
    pub fn sweep(&self) -> Vec<HealthChange> {
        self.stale_agents()
            .iter()
            .filter_map(|id| self.mark_if_stale(id))
            .collect()
    }

    /// Lists agents whose silence currently exceeds the staleness threshold.
    ///
    /// Nothing is modified; callers confirm each candidate with
    /// [`HealthMonitor::mark_if_stale`].
    #[must_use]
    pub fn stale_agents(&self) -> Vec<AgentId> {
        let now = self.clock.utc();
        self.states
            .iter()
            .filter(|entry| self.silence(entry, now).is_some())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Re-checks one agent against the live state and marks it unhealthy
    /// if it is still stale.
    ///
    /// A heartbeat applied after [`HealthMonitor::stale_agents`] listed the
    /// agent wins: the agent is left untouched and `None` is returned.
    pub fn mark_if_stale(&self, id: &AgentId) -> Option<HealthChange> {
        let now = self.clock.utc();
        let change = {
            let mut entry = self.states.get_mut(id)?;
            let silence = self.silence(&entry, now)?;
            entry.record_miss();
            let previous = entry.status();
            if previous == HealthStatus::Unhealthy {
                return None;
            }
            entry.set_status(HealthStatus::Unhealthy);
            warn!(
                agent_id = %id,
                silent_secs = silence.as_secs(),
                "agent went stale"
            );
            HealthChange {
                agent_id: id.clone(),
                previous,
                current: HealthStatus::Unhealthy,
                at: now,
            }
        };
        self.notify(&change);
        Some(change)
    }

    fn silence(&self, state: &HealthState, now: DateTime<Utc>) -> Option<std::time::Duration> {
        let silence = (now - state.liveness_reference())
            .to_std()
            .unwrap_or_default();
        (silence > self.config.staleness_threshold).then_some(silence)
    }

    /// Returns the status of one agent.
    #[must_use]
    pub fn status(&self, id: &AgentId) -> Option<HealthStatus> {
        self.states.get(id).map(|state| state.status())
    }

    /// Returns the full state of one agent.
    #[must_use]
    pub fn state(&self, id: &AgentId) -> Option<HealthState> {
        self.states.get(id).map(|state| *state)
    }

    /// Returns the status of each requested agent, in request order.
    #[must_use]
    pub fn batch_status(&self, ids: &[AgentId]) -> Vec<(AgentId, Option<HealthStatus>)> {
        ids.iter()
            .map(|id| (id.clone(), self.status(id)))
            .collect()
    }

    /// Returns whether an agent is currently healthy.
    #[must_use]
    pub fn is_healthy(&self, id: &AgentId) -> bool {
        self.status(id) == Some(HealthStatus::Healthy)
    }

    /// Counts tracked agents per status.
    #[must_use]
    pub fn counts(&self) -> HealthCounts {
        self.states
            .iter()
            .fold(HealthCounts::default(), |mut counts, entry| {
                match entry.status() {
                    HealthStatus::Healthy => counts.healthy += 1,
                    HealthStatus::Unhealthy => counts.unhealthy += 1,
                    HealthStatus::Unknown => counts.unknown += 1,
                }
                counts
            })
    }

    /// Returns the number of tracked agents.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    fn notify(&self, change: &HealthChange) {
        debug!(
            agent_id = %change.agent_id,
            previous = %change.previous,
            current = %change.current,
            "health status changed"
        );
        if self.notifier.send(change.clone()).is_err() {
            debug!(agent_id = %change.agent_id, "no health subscribers");
        }
    }
}
