//! Normalized invocation outcomes.

use crate::agent::domain::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Normalized answer of a successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    /// Protocol the call was dispatched over.
    pub protocol: Protocol,
    /// Resolved target URL or address.
    pub target: String,
    /// Status code reported by the remote.
    pub status: u16,
    /// Whether the remote reported success.
    pub ok: bool,
    /// Wall-clock time spent in the bridge.
    pub latency: Duration,
    /// Response body, parsed as JSON when possible.
    pub response: Value,
    /// Response headers with lowercase names.
    pub response_headers: BTreeMap<String, String>,
}

impl InvocationResult {
    /// Returns the latency in whole milliseconds.
    #[must_use]
    pub fn latency_ms(&self) -> u64 {
        u64::try_from(self.latency.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Whether a protocol bridge can run and what it depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolAvailability {
    /// Protocol described.
    pub protocol: Protocol,
    /// Whether dispatches over this protocol can succeed.
    pub available: bool,
    /// What the bridge needs to run.
    pub dependency: String,
}
