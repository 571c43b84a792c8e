//! Runtime signals consulted while filtering and ordering results.

use crate::agent::domain::AgentId;

/// Live per-agent facts the discovery index does not own.
///
/// Implementations must be cheap and non-blocking; they are called once per
/// candidate while a query is evaluated.
pub trait RankingSignals: Send + Sync {
    /// Returns whether the agent currently reports `healthy`.
    fn is_healthy(&self, id: &AgentId) -> bool;

    /// Returns the agent's trust score in `[0, 1]`.
    fn trust_score(&self, id: &AgentId) -> f64;

    /// Returns how many invocations were dispatched to the agent.
    fn invocations(&self, id: &AgentId) -> u64;
}
