//! Registered agents: the canonical record model and its ports.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//!
//! Orchestration lives in [`crate::registry`], which is the only writer of
//! agent records.

pub mod adapters;
pub mod domain;
pub mod ports;

#[cfg(test)]
mod tests;
