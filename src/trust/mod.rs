//! Trust scoring from observed agent behaviour.
//!
//! Scores combine heartbeat regularity, invocation success ratio and
//! latency into one value in `[0, 1]`. The engine only reads the agent
//! identifier and health vocabulary from [`crate::agent`]; it has no other
//! dependencies inside the crate.

pub mod domain;
pub mod services;

#[cfg(test)]
mod tests;
