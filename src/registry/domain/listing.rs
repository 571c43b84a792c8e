//! Filters and paging for listing registered agents.

use crate::agent::domain::{AgentRecord, HealthStatus, Protocol};
use crate::discovery::domain::{DEFAULT_LIMIT, Ordering};
use serde::{Deserialize, Serialize};

/// Listing request: optional filters, ordering and one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Protocol the agent must speak.
    pub protocol: Option<Protocol>,
    /// Stored health status the agent must have.
    pub health_status: Option<HealthStatus>,
    /// Tag the agent must carry.
    pub tag: Option<String>,
    /// Primary sort key and direction; ties are broken by ascending id.
    pub ordering: Ordering,
    /// Number of agents to skip.
    pub skip: usize,
    /// Maximum number of agents returned.
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            protocol: None,
            health_status: None,
            tag: None,
            ordering: Ordering::default(),
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Creates a query listing every agent, newest first.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to one protocol.
    #[must_use]
    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Restricts results to one health status.
    #[must_use]
    pub const fn with_health_status(mut self, status: HealthStatus) -> Self {
        self.health_status = Some(status);
        self
    }

    /// Restricts results to agents carrying `tag`.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Resolves caller-supplied sort names; unknown names never fail.
    #[must_use]
    pub fn sorted_by(mut self, sort_by: Option<&str>, order: Option<&str>) -> Self {
        self.ordering = Ordering::resolve(sort_by, order);
        self
    }

    /// Sets an already resolved ordering.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Selects one page.
    #[must_use]
    pub const fn with_page(mut self, skip: usize, limit: usize) -> Self {
        self.skip = skip;
        self.limit = limit;
        self
    }

    /// Returns whether a record passes every filter.
    #[must_use]
    pub fn matches(&self, record: &AgentRecord) -> bool {
        self.protocol.is_none_or(|protocol| record.protocol() == protocol)
            && self
                .health_status
                .is_none_or(|status| record.health_status() == status)
            && self.tag.as_deref().is_none_or(|tag| {
                record
                    .tags()
                    .contains(tag.trim().to_lowercase().as_str())
            })
    }
}
