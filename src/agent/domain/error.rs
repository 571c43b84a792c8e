//! Error types for agent domain validation and parsing.

use super::Protocol;
use thiserror::Error;

/// Errors returned while constructing or mutating agent domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// The agent identifier is empty after trimming.
    #[error("agent id must not be empty")]
    EmptyAgentId,

    /// The agent identifier contains characters outside `[A-Za-z0-9_:-]`.
    #[error(
        "agent id '{0}' contains invalid characters (only alphanumerics, '_', '-' and ':' allowed)"
    )]
    InvalidAgentId(String),

    /// The agent identifier exceeds the 100-character limit.
    #[error("agent id exceeds 100 character limit: {0}")]
    AgentIdTooLong(String),

    /// The agent name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyName,

    /// The agent name exceeds the 100-character limit.
    #[error("agent name exceeds 100 character limit: {0}")]
    NameTooLong(String),

    /// The semantic version is empty after trimming.
    #[error("agent version must not be empty")]
    EmptyVersion,

    /// The semantic version exceeds the 20-character limit.
    #[error("agent version exceeds 20 character limit: {0}")]
    VersionTooLong(String),

    /// The description exceeds the 1000-character limit.
    #[error("agent description exceeds 1000 character limit")]
    DescriptionTooLong,

    /// The manifest declares no skills.
    #[error("agent must declare at least one skill")]
    NoSkills,

    /// A skill name is empty after trimming.
    #[error("skill name must not be empty")]
    EmptySkillName,

    /// A skill name exceeds the 100-character limit.
    #[error("skill name exceeds 100 character limit: {0}")]
    SkillNameTooLong(String),

    /// A skill description is empty after trimming.
    #[error("skill '{0}' must have a description")]
    EmptySkillDescription(String),

    /// A skill description exceeds the 500-character limit.
    #[error("skill '{0}' description exceeds 500 character limit")]
    SkillDescriptionTooLong(String),

    /// Two skills in one manifest share a name.
    #[error("duplicate skill name: {0}")]
    DuplicateSkillName(String),

    /// The endpoint is empty after trimming.
    #[error("agent endpoint must not be empty")]
    MissingEndpoint,

    /// The endpoint does not fit the declared protocol.
    #[error("endpoint '{endpoint}' is not valid for protocol {protocol}")]
    InvalidEndpoint {
        /// Rejected endpoint value.
        endpoint: String,
        /// Protocol the endpoint was validated against.
        protocol: Protocol,
    },

    /// A tag exceeds the 50-character limit.
    #[error("tag exceeds 50 character limit: {0}")]
    TagTooLong(String),

    /// An update names a field outside the permitted set.
    #[error("field '{0}' cannot be updated")]
    UnknownUpdateField(String),

    /// An update payload is not a JSON object or has mistyped values.
    #[error("invalid update payload: {0}")]
    InvalidUpdate(String),

    /// An update carries no fields.
    #[error("update must change at least one field")]
    EmptyUpdate,

    /// The manifest must be signed but carries no signature.
    #[error("manifest signature is required")]
    MissingSignature,

    /// The manifest signature failed verification.
    #[error("manifest signature rejected: {0}")]
    InvalidSignature(String),
}

/// Error returned while parsing a protocol tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown protocol: {0}")]
pub struct ParseProtocolError(pub String);

/// Error returned while parsing a health status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown health status: {0}")]
pub struct ParseHealthStatusError(pub String);
