//! Invocation requests and their resolved destination.

use super::HttpMethod;
use crate::agent::domain::{AgentId, AgentRecord, Protocol};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Caller-supplied parameters of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvocationRequest {
    /// Skill to invoke, when the protocol distinguishes skills.
    pub skill: Option<String>,
    /// Payload forwarded to the agent.
    pub payload: Value,
    /// Path relative to the endpoint, or an absolute URL.
    pub path: Option<String>,
    /// HTTP method for the HTTP-based bridges.
    pub method: HttpMethod,
    /// Deadline for the whole exchange; the gateway default when absent.
    pub timeout: Option<Duration>,
    /// Extra request headers or metadata.
    pub headers: BTreeMap<String, String>,
}

impl Default for InvocationRequest {
    fn default() -> Self {
        Self {
            skill: None,
            payload: Value::Object(serde_json::Map::new()),
            path: None,
            method: HttpMethod::Post,
            timeout: None,
            headers: BTreeMap::new(),
        }
    }
}

impl InvocationRequest {
    /// Creates a `POST` request with the given payload.
    #[must_use]
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    /// Targets a named skill.
    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    /// Sets the path or absolute URL.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the HTTP method.
    #[must_use]
    pub const fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Agent an invocation is dispatched to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchTarget {
    /// Invoked agent.
    pub agent_id: AgentId,
    /// Registered endpoint.
    pub endpoint: String,
    /// Protocol selecting the bridge.
    pub protocol: Protocol,
}

impl DispatchTarget {
    /// Creates a target.
    #[must_use]
    pub fn new(agent_id: AgentId, endpoint: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            agent_id,
            endpoint: endpoint.into(),
            protocol,
        }
    }

    /// Builds the target for a registered agent.
    #[must_use]
    pub fn from_record(record: &AgentRecord) -> Self {
        Self::new(
            record.id().clone(),
            record.endpoint().as_str(),
            record.protocol(),
        )
    }
}
