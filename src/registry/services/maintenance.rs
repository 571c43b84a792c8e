//! Startup load, storage convergence and periodic maintenance passes.

use super::AgentRegistry;
use super::registry::PendingWrite;
use crate::agent::domain::{AgentId, AgentRecord, HealthStatus};
use crate::agent::ports::{EventBus, StorageBackend, StorageError};
use crate::health::domain::HealthChange;
use crate::registry::domain::{ConvergenceReport, RegistryResult};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adoption {
    Added,
    Updated,
    Kept,
}

impl<S, E, C> AgentRegistry<S, E, C>
where
    S: StorageBackend,
    E: EventBus,
    C: Clock + Send + Sync,
{
    /// Loads every stored record and rebuilds derived state from it.
    ///
    /// When storage is unreachable the registry starts empty, is marked
    /// degraded, and picks records up on the next convergence pass.
    ///
    /// # Errors
    ///
    /// Returns [`crate::registry::domain::RegistryError::StorageUnavailable`]
    /// when stored data no longer decodes.
    pub async fn load(&self) -> RegistryResult<usize> {
        let stored = match self.storage.get_all().await {
            Ok(records) => records,
            Err(err @ StorageError::Unavailable(_)) => {
                self.degraded.store(true, Ordering::SeqCst);
                warn!(error = %err, "storage unavailable at startup, starting empty");
                return Ok(0);
            }
            Err(err) => return Err(err.into()),
        };

        self.records.clear();
        self.health.clear();
        for record in &stored {
            self.restore_derived(record);
            self.records.insert(record.id().clone(), record.clone());
        }
        self.discovery.rebuild(&stored);
        self.degraded.store(false, Ordering::SeqCst);
        info!(agents = stored.len(), "registry loaded from storage");
        Ok(stored.len())
    }

    /// Flushes queued writes, then merges storage into memory last-write-wins
    /// by `updated_at`.
    ///
    /// A local record missing from storage is dropped only when it was last
    /// written before the read began and has no queued write. Records deleted
    /// here are not brought back by an older stored copy.
    ///
    /// # Errors
    ///
    /// Returns [`crate::registry::domain::RegistryError::StorageUnavailable`]
    /// when storage cannot be read; the registry is then marked degraded and
    /// left unchanged.
    pub async fn converge(&self) -> RegistryResult<ConvergenceReport> {
        let (flushed, still_pending) = self.flush_pending().await;
        let mut report = ConvergenceReport {
            flushed,
            still_pending,
            ..ConvergenceReport::default()
        };

        let read_started = self.clock.utc();
        let stored = match self.storage.get_all().await {
            Ok(records) => records,
            Err(err) => {
                self.degraded.store(true, Ordering::SeqCst);
                warn!(error = %err, "convergence skipped, storage unavailable");
                return Err(err.into());
            }
        };
        if self.degraded.swap(false, Ordering::SeqCst) {
            info!("storage reachable again");
        }

        let stored_ids: HashSet<AgentId> = stored.iter().map(|record| record.id().clone()).collect();
        for record in stored {
            match self.adopt(record).await {
                Adoption::Added => report.added += 1,
                Adoption::Updated => report.updated += 1,
                Adoption::Kept => {}
            }
        }

        let vanished: Vec<AgentId> = self
            .records
            .iter()
            .map(|entry| entry.key().clone())
            .filter(|id| !stored_ids.contains(id))
            .collect();
        for id in vanished {
            if self.drop_if_vanished(&id, read_started).await {
                report.removed += 1;
            }
        }

        self.tombstones.retain(|id, _| stored_ids.contains(id));
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        debug!(
            flushed = report.flushed,
            pending = report.still_pending,
            added = report.added,
            updated = report.updated,
            removed = report.removed,
            "convergence pass finished"
        );
        Ok(report)
    }

    /// Marks silent agents unhealthy and persists the new status.
    ///
    /// Each candidate is re-checked under its agent lock, so a heartbeat
    /// that lands between the scan and the lock keeps the agent healthy.
    /// Writes that fail here are always queued, whatever the write policy.
    pub async fn sweep(&self) -> Vec<HealthChange> {
        let mut changes = Vec::new();
        for id in self.health.stale_agents() {
            let lock = self.lock_for(&id);
            let _guard = lock.lock().await;
            let current = self.records.get(&id).map(|entry| entry.value().clone());
            let Some(mut next) = current else {
                continue;
            };
            let Some(change) = self.health.mark_if_stale(&id) else {
                continue;
            };
            next.set_health_status(change.current, &*self.clock);
            self.persist_or_queue(&next).await;
            self.discovery.index(&next);
            self.records.insert(id, next);
            self.publish_health_change(&change);
            changes.push(change);
        }
        changes
    }

    /// Pulls idle trust scores toward the neutral baseline and returns how
    /// many moved.
    pub fn decay(&self) -> usize {
        let applied = self.trust.decay_idle();
        for (id, event) in &applied {
            self.announce_trust_event(id, event);
        }
        applied.len()
    }

    async fn flush_pending(&self) -> (usize, usize) {
        let queued: Vec<AgentId> = self.pending.iter().map(|entry| entry.key().clone()).collect();
        let mut flushed = 0;
        for id in queued {
            let lock = self.lock_for(&id);
            let _guard = lock.lock().await;
            let Some(write) = self.pending.get(&id).map(|entry| *entry.value()) else {
                continue;
            };
            let outcome = match write {
                PendingWrite::Upsert => {
                    let current = self.records.get(&id).map(|entry| entry.value().clone());
                    match current {
                        Some(record) => self.storage.upsert(&record).await,
                        None => Ok(()),
                    }
                }
                PendingWrite::Delete => self.storage.delete(&id).await.map(|_| ()),
            };
            if let Err(err) = outcome {
                warn!(agent_id = %id, error = %err, "queued write still failing");
                break;
            }
            self.pending.remove(&id);
            flushed += 1;
        }
        if flushed > 0 {
            info!(flushed, "queued writes persisted");
        }
        (flushed, self.pending.len())
    }

    async fn adopt(&self, stored: AgentRecord) -> Adoption {
        let id = stored.id().clone();
        let lock = self.lock_for(&id);
        let _guard = lock.lock().await;
        if self.pending.contains_key(&id) {
            return Adoption::Kept;
        }
        let deleted_here = self
            .tombstones
            .get(&id)
            .is_some_and(|deleted_at| stored.updated_at() <= *deleted_at);
        if deleted_here {
            return Adoption::Kept;
        }
        let adoption = self.records.get(&id).map_or(Adoption::Added, |local| {
            if stored.updated_at() > local.updated_at() {
                Adoption::Updated
            } else {
                Adoption::Kept
            }
        });
        if adoption == Adoption::Kept {
            return adoption;
        }

        self.tombstones.remove(&id);
        self.restore_derived(&stored);
        self.discovery.index(&stored);
        debug!(agent_id = %id, ?adoption, "stored record adopted");
        self.records.insert(id, stored);
        adoption
    }

    async fn drop_if_vanished(&self, id: &AgentId, read_started: DateTime<Utc>) -> bool {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;
        if self.pending.contains_key(id) {
            return false;
        }
        let stale = self
            .records
            .get(id)
            .is_some_and(|local| local.updated_at() < read_started);
        if stale {
            self.forget(id);
            debug!(agent_id = %id, "record removed from storage, dropped locally");
        }
        stale
    }

    fn restore_derived(&self, record: &AgentRecord) {
        let id = record.id();
        self.health.restore(
            id,
            record.health_status(),
            record.last_heartbeat(),
            record.created_at(),
        );
        self.trust.track(id);
        if record.health_status() == HealthStatus::Unhealthy {
            // Re-apply the penalty the stored status implies; no event.
            drop(self.trust.observe_health(id, HealthStatus::Unhealthy));
        }
    }
}
