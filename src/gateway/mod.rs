//! Invocation of agents over their declared wire protocol.
//!
//! - Domain types in [`domain`]
//! - Transport ports in [`ports`]
//! - `reqwest` and `tokio-tungstenite` adapters in [`adapters`]
//! - The [`services::ProtocolGateway`] in [`services`]

pub mod adapters;
mod bridges;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
