//! Domain model for registered agents.
//!
//! Agents are described by an [`AgentRecord`], created from a validated
//! [`AgentManifest`] and changed afterwards only through [`AgentUpdate`]s and
//! heartbeats. All infrastructure concerns stay outside this boundary.

mod error;
mod event;
mod fields;
mod health;
mod ids;
mod manifest;
mod protocol;
mod record;
mod skill;
mod update;

pub use error::{AgentDomainError, ParseHealthStatusError, ParseProtocolError};
pub use event::{RegistryEvent, RegistryEventKind};
pub use health::HealthStatus;
pub use ids::AgentId;
pub use manifest::{AgentManifest, ManifestSignature, SkillManifest};
pub use protocol::{Endpoint, Protocol};
pub use record::{AgentRecord, PersistedAgentData};
pub use skill::Skill;
pub use update::AgentUpdate;
