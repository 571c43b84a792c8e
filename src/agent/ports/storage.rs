//! Storage port for canonical agent records.

use crate::agent::domain::{AgentId, AgentRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence contract shared by every registry instance.
///
/// Implementations only store and return records; validation, indexing and
/// conflict resolution stay in the registry.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Inserts or replaces the record stored under its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend cannot be
    /// reached.
    async fn upsert(&self, record: &AgentRecord) -> StorageResult<()>;

    /// Removes a record, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend cannot be
    /// reached.
    async fn delete(&self, id: &AgentId) -> StorageResult<bool>;

    /// Returns every stored record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend cannot be
    /// reached, or [`StorageError::InvalidPersistedData`] when stored data no
    /// longer decodes.
    async fn get_all(&self) -> StorageResult<Vec<AgentRecord>>;

    /// Returns one record, or `None` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when the backend cannot be
    /// reached.
    async fn get(&self, id: &AgentId) -> StorageResult<Option<AgentRecord>>;
}

/// Errors returned by storage backends.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The backend is temporarily unreachable.
    #[error("storage unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),

    /// Stored data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps a transport or connection failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }

    /// Wraps a decoding failure for stored data.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }
}
