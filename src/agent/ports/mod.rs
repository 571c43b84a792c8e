//! Port contracts for agent persistence, notifications and signatures.

pub mod events;
pub mod signature;
pub mod storage;

pub use events::EventBus;
pub use signature::{SignatureError, SignatureVerifier};
pub use storage::{StorageBackend, StorageError, StorageResult};
