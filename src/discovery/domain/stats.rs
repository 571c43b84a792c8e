//! Index size counters.

use serde::{Deserialize, Serialize};

/// Number of entries in each discovery index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Indexed agents.
    pub agents: usize,
    /// Distinct skill names.
    pub skills: usize,
    /// Distinct protocols in use.
    pub protocols: usize,
    /// Distinct tags.
    pub tags: usize,
    /// Distinct text tokens.
    pub tokens: usize,
}
