//! Ranked search results.

use crate::agent::domain::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Record field a text match was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedField {
    /// Agent name.
    Name,
    /// Agent tags.
    Tags,
    /// Skill names.
    Skills,
    /// Agent description.
    Description,
}

impl MatchedField {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Tags => "tags",
            Self::Skills => "skills",
            Self::Description => "description",
        }
    }

    /// Relevance weight of an exact token match in this field.
    #[must_use]
    pub const fn weight(self) -> f64 {
        match self {
            Self::Name => 3.0,
            Self::Tags => 2.0,
            Self::Skills => 1.5,
            Self::Description => 1.0,
        }
    }
}

impl fmt::Display for MatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One agent matched by a text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Matched agent.
    pub id: AgentId,
    /// Relevance score, larger is better.
    pub score: f64,
    /// Fields that matched at least one query token, in canonical order.
    pub matched_fields: Vec<MatchedField>,
}
