//! Adapter implementations of the agent ports.

pub mod events;
pub mod memory;
pub mod signature;

pub use events::BroadcastEventBus;
pub use signature::Ed25519Verifier;
