//! Invocation through the protocol gateway.

use super::AgentRegistry;
use crate::agent::domain::AgentId;
use crate::agent::ports::{EventBus, StorageBackend};
use crate::gateway::domain::{DispatchTarget, GatewayError, InvocationRequest, InvocationResult};
use crate::registry::domain::{RegistryError, RegistryResult};
use crate::trust::domain::TrustEventKind;
use mockable::Clock;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

impl<S, E, C> AgentRegistry<S, E, C>
where
    S: StorageBackend,
    E: EventBus,
    C: Clock + Send + Sync,
{
    /// Dispatches an invocation to an agent and feeds the outcome into its
    /// metrics and trust score.
    ///
    /// Caller mistakes and missing bridges leave metrics and trust untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent,
    /// [`RegistryError::UnknownSkill`] when the named skill is not declared,
    /// and [`RegistryError::Gateway`] carrying the dispatch failure.
    pub async fn invoke(
        &self,
        id: &AgentId,
        request: &InvocationRequest,
    ) -> RegistryResult<InvocationResult> {
        let record = self.get(id)?;
        if let Some(skill) = request
            .skill
            .as_deref()
            .filter(|name| record.skill(name).is_none())
        {
            return Err(RegistryError::UnknownSkill {
                agent_id: id.clone(),
                skill: skill.to_owned(),
            });
        }

        let target = DispatchTarget::from_record(&record);
        let started = Instant::now();
        match self.gateway.dispatch(&target, request).await {
            Ok(result) => {
                self.record_outcome(id, result.latency_ms(), false);
                Ok(result)
            }
            Err(err) if err.affects_trust() => {
                let latency = match &err {
                    GatewayError::Timeout { timeout, .. } => *timeout,
                    _ => started.elapsed(),
                };
                self.record_outcome(id, millis(latency), true);
                debug!(agent_id = %id, error = %err, "invocation failure recorded");
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn record_outcome(&self, id: &AgentId, latency_ms: u64, failed: bool) {
        // The agent may have been deleted while the call was in flight.
        if !self.records.contains_key(id) {
            return;
        }
        self.metrics
            .entry(id.clone())
            .or_default()
            .record(latency_ms, failed);
        let kind = if failed {
            TrustEventKind::Failure
        } else {
            TrustEventKind::Success
        };
        self.apply_trust(id, kind, Some(latency_magnitude(latency_ms)));
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn latency_magnitude(latency_ms: u64) -> f64 {
    f64::from(u32::try_from(latency_ms).unwrap_or(u32::MAX))
}
