//! Agentmesh: registry and discovery service for networked software agents.
//!
//! The crate accepts agent capability manifests, keeps them discoverable by
//! skill, protocol, tag and free text, tracks agent liveness, scores
//! trustworthiness from observed behaviour, and dispatches invocations over
//! several wire protocols.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure types and rules with no infrastructure dependencies
//! - **Ports**: Trait interfaces for storage, events, signatures and transports
//! - **Adapters**: Concrete implementations of ports (in-memory, `reqwest`, etc.)
//!
//! # Modules
//!
//! - [`agent`]: Agent records, manifests and their ports
//! - [`health`]: Heartbeat and staleness tracking
//! - [`discovery`]: Inverted indexes and text ranking
//! - [`trust`]: Trust scoring from events
//! - [`gateway`]: Protocol bridges for invocations
//! - [`registry`]: The coordinator that owns the record set
//! - [`config`]: Settings and environment overrides

pub mod agent;
pub mod config;
pub mod discovery;
pub mod gateway;
pub mod health;
pub mod registry;
pub mod trust;

#[cfg(test)]
mod test_support;
