//! Identifier type for registered agents.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of an agent identifier.
const MAX_ID_LENGTH: usize = 100;

/// Stable, caller-chosen identifier of a registered agent.
///
/// Identifiers are case-sensitive and limited to ASCII alphanumerics plus
/// `_`, `-` and `:` so that decentralized identifiers such as
/// `did:agent:3f9a...` are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentId(String);

impl AgentId {
    /// Creates a validated agent identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyAgentId`] when the value is empty after
    /// trimming, [`AgentDomainError::AgentIdTooLong`] when it exceeds 100
    /// characters, or [`AgentDomainError::InvalidAgentId`] when it contains
    /// characters outside the permitted set.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(AgentDomainError::EmptyAgentId);
        }

        if normalized.len() > MAX_ID_LENGTH {
            return Err(AgentDomainError::AgentIdTooLong(raw));
        }

        let is_valid = normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':'));
        if !is_valid {
            return Err(AgentDomainError::InvalidAgentId(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AgentId {
    type Error = AgentDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentId> for String {
    fn from(value: AgentId) -> Self {
        value.0
    }
}

impl AsRef<str> for AgentId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
