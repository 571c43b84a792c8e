//! Agent registry: the canonical record set and its orchestration.
//!
//! [`services::AgentRegistry`] is the only writer of agent records and the
//! only component talking to the storage backend. Every write flows through
//! it to the health monitor, the discovery index and the trust manager;
//! invocations flow through it to the protocol gateway.
//!
//! - Request, response and error types in [`domain`]
//! - The registry and its background tasks in [`services`]

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
