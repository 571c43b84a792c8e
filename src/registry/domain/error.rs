//! Registry error types and their stable kinds.

use crate::agent::domain::{AgentDomainError, AgentId};
use crate::agent::ports::StorageError;
use crate::config::ConfigError;
use crate::gateway::domain::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned by registry operations.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// Caller input failed validation.
    #[error(transparent)]
    Validation(#[from] AgentDomainError),

    /// An agent with the same identifier is already registered.
    #[error("agent already registered: {0}")]
    DuplicateId(AgentId),

    /// No agent is registered under the identifier.
    #[error("agent not found: {0}")]
    NotFound(AgentId),

    /// The invocation names a skill the agent does not declare.
    #[error("agent {agent_id} has no skill named '{skill}'")]
    UnknownSkill {
        /// Invoked agent.
        agent_id: AgentId,
        /// Requested skill.
        skill: String,
    },

    /// Storage rejected a write under the fail-fast policy, or could not be
    /// read.
    #[error(transparent)]
    StorageUnavailable(#[from] StorageError),

    /// The invocation could not be dispatched or failed remotely.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Registry configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

impl RegistryError {
    /// Returns the stable kind reported to clients.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::UnknownSkill { .. } | Self::Config(_) => {
                ErrorKind::ValidationError
            }
            Self::DuplicateId(_) => ErrorKind::DuplicateId,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::Gateway(err) => match err {
                GatewayError::InvalidRequest(_) => ErrorKind::ValidationError,
                GatewayError::BridgeUnavailable { .. } => ErrorKind::BridgeUnavailable,
                GatewayError::Timeout { .. } => ErrorKind::Timeout,
                GatewayError::RemoteError { .. } => ErrorKind::RemoteError,
                GatewayError::TargetUnreachable { .. } => ErrorKind::TargetUnreachable,
            },
        }
    }
}

/// Stable, serializable classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input was rejected.
    ValidationError,
    /// The agent does not exist.
    NotFound,
    /// The identifier is taken.
    DuplicateId,
    /// Storage is unreachable.
    StorageUnavailable,
    /// The protocol bridge cannot run.
    BridgeUnavailable,
    /// The remote did not answer in time.
    Timeout,
    /// The remote answered with a failure.
    RemoteError,
    /// No connection to the remote could be made.
    TargetUnreachable,
}

impl ErrorKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::NotFound => "not_found",
            Self::DuplicateId => "duplicate_id",
            Self::StorageUnavailable => "storage_unavailable",
            Self::BridgeUnavailable => "bridge_unavailable",
            Self::Timeout => "timeout",
            Self::RemoteError => "remote_error",
            Self::TargetUnreachable => "target_unreachable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
