//! Notifications published when agent state changes.

use super::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Kind of registry notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryEventKind {
    /// A new agent was registered.
    AgentRegistered,
    /// An agent's mutable fields changed.
    AgentUpdated,
    /// An agent's health status changed.
    AgentHealthChanged,
    /// An agent's trust score changed.
    TrustScoreChanged,
}

impl RegistryEventKind {
    /// Returns the event name used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AgentRegistered => "agent_registered",
            Self::AgentUpdated => "agent_updated",
            Self::AgentHealthChanged => "agent_health_changed",
            Self::TrustScoreChanged => "trust_score_changed",
        }
    }
}

impl fmt::Display for RegistryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named change to one agent with a minimal diff payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryEvent {
    kind: RegistryEventKind,
    agent_id: AgentId,
    payload: Value,
    timestamp: DateTime<Utc>,
}

impl RegistryEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(
        kind: RegistryEventKind,
        agent_id: AgentId,
        payload: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            agent_id,
            payload,
            timestamp,
        }
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> RegistryEventKind {
        self.kind
    }

    /// Returns the affected agent.
    #[must_use]
    pub const fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Returns the diff payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns when the change happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
