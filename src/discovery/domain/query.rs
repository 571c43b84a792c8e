//! Discovery query parameters and ordering keys.

use crate::agent::domain::Protocol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page size for discovery queries and registry listings.
pub const DEFAULT_LIMIT: usize = 50;

/// Ordering key for unranked result sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Current trust score.
    TrustScore,
    /// Last modification time.
    #[default]
    UpdatedAt,
    /// Registration time.
    CreatedAt,
    /// Number of invocations dispatched to the agent.
    Invocations,
}

impl SortKey {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TrustScore => "trust_score",
            Self::UpdatedAt => "updated_at",
            Self::CreatedAt => "created_at",
            Self::Invocations => "invocations",
        }
    }

    /// Looks up a key by name, returning `None` for unrecognised names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "trust_score" => Some(Self::TrustScore),
            "updated_at" => Some(Self::UpdatedAt),
            "created_at" => Some(Self::CreatedAt),
            "invocations" => Some(Self::Invocations),
            _ => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of an ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest first.
    Asc,
    /// Largest first.
    #[default]
    Desc,
}

impl SortOrder {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Looks up an order by name, returning `None` for unrecognised names.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved ordering for an unranked result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    /// Primary key.
    pub key: SortKey,
    /// Direction of the primary key. Ties are always broken by ascending id.
    pub order: SortOrder,
}

impl Ordering {
    /// Resolves caller-supplied names.
    ///
    /// An unrecognised key falls back to `updated_at` descending whatever
    /// order was requested. An unrecognised order on a known key falls back
    /// to descending.
    #[must_use]
    pub fn resolve(sort_by: Option<&str>, order: Option<&str>) -> Self {
        let Some(name) = sort_by else {
            return Self {
                key: SortKey::UpdatedAt,
                order: order.and_then(SortOrder::from_name).unwrap_or_default(),
            };
        };
        SortKey::from_name(name).map_or_else(Self::default, |key| Self {
            key,
            order: order.and_then(SortOrder::from_name).unwrap_or_default(),
        })
    }
}

/// Filtered, optionally ranked lookup over the discovery index.
///
/// Every present filter must match. When `text` yields at least one token
/// results are ranked by relevance and `ordering` is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryQuery {
    /// Skill name the agent must declare.
    pub skill: Option<String>,
    /// Protocol the agent must speak.
    pub protocol: Option<Protocol>,
    /// Tags the agent must carry, all of them.
    pub tags: Vec<String>,
    /// Free text to rank by.
    pub text: Option<String>,
    /// Drop agents whose health is not `healthy`.
    pub healthy_only: bool,
    /// Maximum number of results.
    pub limit: usize,
    /// Number of results to skip.
    pub offset: usize,
    /// Ordering for unranked queries.
    pub ordering: Ordering,
}

impl Default for DiscoveryQuery {
    fn default() -> Self {
        Self {
            skill: None,
            protocol: None,
            tags: Vec::new(),
            text: None,
            healthy_only: false,
            limit: DEFAULT_LIMIT,
            offset: 0,
            ordering: Ordering::default(),
        }
    }
}

impl DiscoveryQuery {
    /// Creates a query matching every indexed agent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires the given skill.
    #[must_use]
    pub fn with_skill(mut self, skill: impl Into<String>) -> Self {
        self.skill = Some(skill.into());
        self
    }

    /// Requires the given protocol.
    #[must_use]
    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    /// Requires the given tag, in addition to any already required.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Ranks results against free text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Restricts results to healthy agents.
    #[must_use]
    pub const fn healthy_only(mut self, healthy_only: bool) -> Self {
        self.healthy_only = healthy_only;
        self
    }

    /// Sets the page window.
    #[must_use]
    pub const fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    /// Sets the ordering used when the query is unranked.
    #[must_use]
    pub const fn with_ordering(mut self, ordering: Ordering) -> Self {
        self.ordering = ordering;
        self
    }
}
