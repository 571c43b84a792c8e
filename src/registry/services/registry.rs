//! Canonical record coordinator.
//!
//! Provides [`AgentRegistry`], the single writer of the agent record set. It
//! validates and persists records and keeps the health monitor, discovery
//! index and trust manager in step with every write.

use super::signals::RegistrySignals;
use crate::agent::adapters::Ed25519Verifier;
use crate::agent::domain::{
    AgentDomainError, AgentId, AgentManifest, AgentRecord, AgentUpdate, HealthStatus,
    RegistryEvent, RegistryEventKind,
};
use crate::agent::ports::{EventBus, SignatureVerifier, StorageBackend, StorageError};
use crate::config::{ConfigError, RegistryConfig, WritePolicy};
use crate::discovery::domain::DiscoveryQuery;
use crate::discovery::services::{DiscoveryService, UnrankedRow, sort_unranked};
use crate::gateway::services::ProtocolGateway;
use crate::health::domain::{HealthChange, HeartbeatOutcome};
use crate::health::services::HealthMonitor;
use crate::registry::domain::{
    AgentStats, InvocationMetrics, ListQuery, RegistryError, RegistryResult, RegistryStats,
    SearchMatch,
};
use crate::trust::domain::{ScoreChange, TrustEvent, TrustEventKind};
use crate::trust::services::TrustManager;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use mockable::Clock;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Score movements smaller than this are not announced.
const SCORE_EPSILON: f64 = 1e-4;

/// Write that could not reach storage and waits for the next convergence
/// pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PendingWrite {
    /// Store the current in-memory record.
    Upsert,
    /// Remove the record from storage.
    Delete,
}

/// Agent registry composed over a storage backend, an event bus and a clock.
///
/// Writes to one agent are serialized by a per-agent async mutex; writes to
/// different agents proceed concurrently. Reads never wait on storage.
pub struct AgentRegistry<S, E, C>
where
    S: StorageBackend,
    E: EventBus,
    C: Clock + Send + Sync,
{
    pub(super) config: RegistryConfig,
    pub(super) storage: Arc<S>,
    pub(super) events: Arc<E>,
    pub(super) clock: Arc<C>,
    pub(super) verifier: Arc<dyn SignatureVerifier>,
    pub(super) gateway: ProtocolGateway,
    pub(super) health: HealthMonitor<C>,
    pub(super) trust: TrustManager<C>,
    pub(super) discovery: DiscoveryService,
    pub(super) records: DashMap<AgentId, AgentRecord>,
    pub(super) metrics: DashMap<AgentId, InvocationMetrics>,
    pub(super) locks: DashMap<AgentId, Arc<Mutex<()>>>,
    pub(super) pending: DashMap<AgentId, PendingWrite>,
    pub(super) tombstones: DashMap<AgentId, DateTime<Utc>>,
    pub(super) degraded: AtomicBool,
}

impl<S, E, C> AgentRegistry<S, E, C>
where
    S: StorageBackend,
    E: EventBus,
    C: Clock + Send + Sync,
{
    /// Creates an empty registry. Call [`AgentRegistry::load`] before serving
    /// traffic.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Config`] when `config` fails validation, or
    /// [`RegistryError::Gateway`] when the HTTP client cannot be built.
    pub fn new(
        config: RegistryConfig,
        storage: Arc<S>,
        events: Arc<E>,
        clock: Arc<C>,
    ) -> RegistryResult<Self> {
        config.validate()?;
        let gateway = ProtocolGateway::new(config.gateway.clone())?;
        let health = HealthMonitor::new(config.health, Arc::clone(&clock));
        let trust =
            TrustManager::new(config.trust.clone(), Arc::clone(&clock)).map_err(ConfigError::from)?;
        Ok(Self {
            config,
            storage,
            events,
            clock,
            verifier: Arc::new(Ed25519Verifier::new()),
            gateway,
            health,
            trust,
            discovery: DiscoveryService::new(),
            records: DashMap::new(),
            metrics: DashMap::new(),
            locks: DashMap::new(),
            pending: DashMap::new(),
            tombstones: DashMap::new(),
            degraded: AtomicBool::new(false),
        })
    }

    /// Replaces the protocol gateway, for example one with injected
    /// transports.
    #[must_use]
    pub fn with_gateway(mut self, gateway: ProtocolGateway) -> Self {
        self.gateway = gateway;
        self
    }

    /// Replaces the manifest signature verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn SignatureVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the event bus registry events are published on.
    #[must_use]
    pub fn events(&self) -> &E {
        &self.events
    }

    /// Returns the liveness tracker.
    #[must_use]
    pub const fn health(&self) -> &HealthMonitor<C> {
        &self.health
    }

    /// Returns the trust engine.
    #[must_use]
    pub const fn trust(&self) -> &TrustManager<C> {
        &self.trust
    }

    /// Returns the discovery index.
    #[must_use]
    pub const fn discovery(&self) -> &DiscoveryService {
        &self.discovery
    }

    /// Returns the protocol gateway.
    #[must_use]
    pub const fn gateway(&self) -> &ProtocolGateway {
        &self.gateway
    }

    /// Returns whether the last storage read failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::SeqCst)
    }

    /// Returns the number of writes waiting for storage.
    #[must_use]
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// Registers an agent from its manifest and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] when the manifest or its
    /// signature is rejected, [`RegistryError::DuplicateId`] when the id is
    /// taken, and [`RegistryError::StorageUnavailable`] when storage is down
    /// under the fail-fast policy. Nothing is mutated on error.
    pub async fn register(&self, manifest: AgentManifest) -> RegistryResult<AgentId> {
        self.verify_signature(&manifest)?;
        let record = AgentRecord::from_manifest(manifest, &*self.clock)?;
        let id = record.id().clone();

        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        if self.records.contains_key(&id) {
            return Err(RegistryError::DuplicateId(id));
        }
        self.persist(&record).await?;

        self.tombstones.remove(&id);
        self.health.track(&id, record.created_at());
        self.trust.track(&id);
        self.discovery.index(&record);
        let payload = json!({
            "name": record.name(),
            "version": record.version(),
            "protocol": record.protocol().as_str(),
            "endpoint": record.endpoint().as_str(),
            "skills": record.skills().iter().map(|skill| skill.name()).collect::<Vec<_>>(),
        });
        self.records.insert(id.clone(), record);

        info!(agent_id = %id, "agent registered");
        self.emit(RegistryEventKind::AgentRegistered, &id, payload);
        Ok(id)
    }

    /// Applies a partial update and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent,
    /// [`RegistryError::Validation`] for an empty or invalid update, and
    /// [`RegistryError::StorageUnavailable`] under the fail-fast policy.
    pub async fn update(&self, id: &AgentId, update: &AgentUpdate) -> RegistryResult<AgentRecord> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        let mut next = self.get(id)?;
        let changes = next.apply_update(update, &*self.clock)?;
        self.persist(&next).await?;

        self.discovery.index(&next);
        self.records.insert(id.clone(), next.clone());
        if let Some(change) = update
            .health_status
            .and_then(|status| self.health.set_status(id, status))
        {
            self.publish_health_change(&change);
        }

        debug!(agent_id = %id, fields = changes.len(), "agent updated");
        self.emit(RegistryEventKind::AgentUpdated, id, Value::Object(changes));
        Ok(next)
    }

    /// Parses a JSON update payload and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] when the payload names a field
    /// outside [`AgentUpdate::PERMITTED_FIELDS`] or is mistyped, and
    /// otherwise the errors of [`AgentRegistry::update`].
    pub async fn update_json(&self, id: &AgentId, payload: &Value) -> RegistryResult<AgentRecord> {
        let update = AgentUpdate::from_json(payload)?;
        self.update(id, &update).await
    }

    /// Removes an agent with its health state, index entries, trust history
    /// and metrics.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent, and
    /// [`RegistryError::StorageUnavailable`] under the fail-fast policy.
    pub async fn delete(&self, id: &AgentId) -> RegistryResult<()> {
        {
            let lock = self.lock_for(id);
            let _guard = lock.lock().await;
            if !self.records.contains_key(id) {
                return Err(RegistryError::NotFound(id.clone()));
            }
            match self.storage.delete(id).await {
                Ok(_) => {
                    self.pending.remove(id);
                }
                Err(err) => self.defer(id, PendingWrite::Delete, err)?,
            }
            self.forget(id);
            self.tombstones.insert(id.clone(), self.clock.utc());
            info!(agent_id = %id, "agent deleted");
        }
        self.locks
            .remove_if(id, |_, lock| Arc::strong_count(lock) == 1);
        Ok(())
    }

    /// Returns one record.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent.
    pub fn get(&self, id: &AgentId) -> RegistryResult<AgentRecord> {
        self.records
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| RegistryError::NotFound(id.clone()))
    }

    /// Returns one page of records passing the listing filters.
    #[must_use]
    pub fn list(&self, query: &ListQuery) -> Vec<AgentRecord> {
        let rows: Vec<UnrankedRow> = self
            .records
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| (entry.key().clone(), entry.created_at(), entry.updated_at()))
            .collect();
        sort_unranked(rows, query.ordering, &self.signals())
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .filter_map(|id| self.records.get(&id).map(|entry| entry.value().clone()))
            .collect()
    }

    /// Records a heartbeat and returns the clamped instant and any status
    /// transition.
    ///
    /// `agent_health_changed` is emitted only when the status actually
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent, and
    /// [`RegistryError::StorageUnavailable`] under the fail-fast policy.
    pub async fn heartbeat(
        &self,
        id: &AgentId,
        status: HealthStatus,
        at: Option<DateTime<Utc>>,
    ) -> RegistryResult<HeartbeatOutcome> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        let mut next = self.get(id)?;
        let now = self.clock.utc();
        let observed_at = at.map_or(now, |reported| reported.min(now));
        next.record_heartbeat(status, observed_at, &*self.clock);
        self.persist(&next).await?;

        let outcome = self.health.heartbeat(id, status, Some(observed_at));
        self.discovery.index(&next);
        self.records.insert(id.clone(), next);
        self.apply_trust(id, TrustEventKind::Heartbeat, None);
        if let Some(change) = &outcome.change {
            self.publish_health_change(change);
        }
        debug!(agent_id = %id, status = %status, "heartbeat recorded");
        Ok(outcome)
    }

    /// Returns the live health status of each requested agent, in request
    /// order.
    #[must_use]
    pub fn batch_health(&self, ids: &[AgentId]) -> Vec<(AgentId, Option<HealthStatus>)> {
        self.health.batch_status(ids)
    }

    /// Runs a discovery query and returns the matching records.
    #[must_use]
    pub fn discover(&self, query: &DiscoveryQuery) -> Vec<AgentRecord> {
        self.discovery
            .query(query, &self.signals())
            .into_iter()
            .filter_map(|id| self.records.get(&id).map(|entry| entry.value().clone()))
            .collect()
    }

    /// Ranks every agent against free text.
    #[must_use]
    pub fn search(&self, text: &str, limit: usize) -> Vec<SearchMatch> {
        self.discovery
            .search(text, limit)
            .into_iter()
            .filter_map(|hit| {
                let record = self.records.get(&hit.id)?.value().clone();
                Some(SearchMatch {
                    record,
                    score: hit.score,
                    matched_fields: hit.matched_fields,
                })
            })
            .collect()
    }

    /// Returns registry-wide counters.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let mut protocols = BTreeMap::new();
        for entry in &self.records {
            *protocols.entry(entry.protocol()).or_insert(0) += 1;
        }
        RegistryStats {
            total_agents: self.records.len(),
            health: self.health.counts(),
            protocols,
            pending_writes: self.pending.len(),
            degraded: self.is_degraded(),
            index: self.discovery.stats(),
        }
    }

    /// Returns the invocation metrics and trust breakdown of one agent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent.
    pub fn agent_stats(&self, id: &AgentId) -> RegistryResult<AgentStats> {
        let record = self.get(id)?;
        let state = self.health.state(id);
        Ok(AgentStats {
            agent_id: id.clone(),
            health: state.map_or(record.health_status(), |live| live.status()),
            consecutive_misses: state.map_or(0, |live| live.consecutive_misses()),
            metrics: self
                .metrics
                .get(id)
                .map(|entry| *entry.value())
                .unwrap_or_default(),
            trust: self.trust.score(id),
        })
    }

    /// Returns up to `limit` most recent trust events of one agent, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown agent.
    pub fn trust_history(&self, id: &AgentId, limit: usize) -> RegistryResult<Vec<TrustEvent>> {
        if !self.records.contains_key(id) {
            return Err(RegistryError::NotFound(id.clone()));
        }
        Ok(self.trust.history(id, limit))
    }

    pub(super) fn signals(&self) -> RegistrySignals<'_, C> {
        RegistrySignals {
            health: &self.health,
            trust: &self.trust,
            metrics: &self.metrics,
        }
    }

    pub(super) fn lock_for(&self, id: &AgentId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(id.clone()).or_default().value())
    }

    /// Writes a record through, or queues it under the queue policy.
    pub(super) async fn persist(&self, record: &AgentRecord) -> RegistryResult<()> {
        match self.storage.upsert(record).await {
            Ok(()) => {
                self.pending.remove(record.id());
                Ok(())
            }
            Err(err) => self.defer(record.id(), PendingWrite::Upsert, err),
        }
    }

    /// Writes a record through, queueing it on failure whatever the policy.
    pub(super) async fn persist_or_queue(&self, record: &AgentRecord) {
        match self.storage.upsert(record).await {
            Ok(()) => {
                self.pending.remove(record.id());
            }
            Err(err) => {
                warn!(agent_id = %record.id(), error = %err, "storage unavailable, write queued");
                self.pending.insert(record.id().clone(), PendingWrite::Upsert);
            }
        }
    }

    fn defer(&self, id: &AgentId, write: PendingWrite, err: StorageError) -> RegistryResult<()> {
        match self.config.write_policy {
            WritePolicy::FailFast => {
                warn!(agent_id = %id, error = %err, "storage unavailable, write rejected");
                Err(RegistryError::StorageUnavailable(err))
            }
            WritePolicy::Queue => {
                warn!(agent_id = %id, error = %err, "storage unavailable, write queued");
                self.pending.insert(id.clone(), write);
                Ok(())
            }
        }
    }

    /// Drops every trace of an agent from memory.
    pub(super) fn forget(&self, id: &AgentId) {
        self.records.remove(id);
        self.health.remove(id);
        self.discovery.deindex(id);
        self.trust.remove(id);
        self.metrics.remove(id);
    }

    fn verify_signature(&self, manifest: &AgentManifest) -> RegistryResult<()> {
        match &manifest.signature {
            Some(signature) => self
                .verifier
                .verify(&manifest.signing_payload(), signature)
                .map_err(|err| {
                    RegistryError::from(AgentDomainError::InvalidSignature(err.to_string()))
                }),
            None if self.config.require_signatures => {
                Err(AgentDomainError::MissingSignature.into())
            }
            None => Ok(()),
        }
    }

    pub(super) fn emit(&self, kind: RegistryEventKind, id: &AgentId, payload: Value) {
        self.events
            .publish(RegistryEvent::new(kind, id.clone(), payload, self.clock.utc()));
    }

    /// Applies a trust event and announces a visible score movement.
    pub(super) fn apply_trust(&self, id: &AgentId, kind: TrustEventKind, magnitude: Option<f64>) {
        if let Some(event) = self.trust.apply(id, kind, magnitude) {
            self.announce_trust_event(id, &event);
        }
    }

    pub(super) fn announce_trust_event(&self, id: &AgentId, event: &TrustEvent) {
        if event.delta().abs() < SCORE_EPSILON {
            return;
        }
        self.emit(
            RegistryEventKind::TrustScoreChanged,
            id,
            json!({
                "previous": score_before(event),
                "current": event.score(),
                "reason": event.kind().as_str(),
            }),
        );
    }

    fn announce_score_change(&self, change: &ScoreChange) {
        self.emit(
            RegistryEventKind::TrustScoreChanged,
            &change.agent_id,
            json!({
                "previous": change.previous,
                "current": change.current,
                "reason": "health",
            }),
        );
    }

    /// Emits a health transition and feeds it into the trust penalty.
    pub(super) fn publish_health_change(&self, change: &HealthChange) {
        self.emit(
            RegistryEventKind::AgentHealthChanged,
            &change.agent_id,
            json!({
                "previous": change.previous.as_str(),
                "current": change.current.as_str(),
            }),
        );
        if let Some(score) = self.trust.observe_health(&change.agent_id, change.current) {
            self.announce_score_change(&score);
        }
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "the score before an event is its result minus its delta"
)]
fn score_before(event: &TrustEvent) -> f64 {
    event.score() - event.delta()
}
