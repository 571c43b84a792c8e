//! In-memory storage backend for tests and single-node deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::agent::{
    domain::{AgentId, AgentRecord},
    ports::{StorageBackend, StorageError, StorageResult},
};

/// Thread-safe in-memory storage backend.
///
/// Clones share the same state, so several registries built over clones of
/// one instance behave like instances sharing a database. The availability
/// switch simulates an outage: while offline every operation fails with
/// [`StorageError::Unavailable`].
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    records: Arc<RwLock<HashMap<AgentId, AgentRecord>>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self {
            records: Arc::default(),
            available: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InMemoryStorage {
    /// Creates an empty, available store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches the simulated backend on or off.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns whether the simulated backend is reachable.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn ensure_available(&self) -> StorageResult<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(StorageError::unavailable(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "in-memory storage is offline",
            )))
        }
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    async fn upsert(&self, record: &AgentRecord) -> StorageResult<()> {
        self.ensure_available()?;
        let mut records = self
            .records
            .write()
            .map_err(|err| StorageError::unavailable(std::io::Error::other(err.to_string())))?;
        records.insert(record.id().clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &AgentId) -> StorageResult<bool> {
        self.ensure_available()?;
        let mut records = self
            .records
            .write()
            .map_err(|err| StorageError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(records.remove(id).is_some())
    }

    async fn get_all(&self) -> StorageResult<Vec<AgentRecord>> {
        self.ensure_available()?;
        let records = self
            .records
            .read()
            .map_err(|err| StorageError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(records.values().cloned().collect())
    }

    async fn get(&self, id: &AgentId) -> StorageResult<Option<AgentRecord>> {
        self.ensure_available()?;
        let records = self
            .records
            .read()
            .map_err(|err| StorageError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(records.get(id).cloned())
    }
}
