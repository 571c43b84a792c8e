//! Registration payloads submitted by agents.

use super::Protocol;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// Skill entry of an [`AgentManifest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillManifest {
    /// Skill name, unique within the manifest.
    pub name: String,
    /// Human-readable skill description.
    pub description: String,
    /// Optional JSON schema for accepted input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    /// Optional JSON schema for produced output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

impl SkillManifest {
    /// Creates a skill entry without schemas.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
            output_schema: None,
        }
    }
}

/// Detached Ed25519 signature over [`AgentManifest::signing_payload`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManifestSignature {
    /// Base64-encoded 64-byte signature.
    pub signature: String,
    /// Base64-encoded 32-byte public key.
    pub public_key: String,
}

impl ManifestSignature {
    /// Creates a signature pair from base64 strings.
    #[must_use]
    pub fn new(signature: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            public_key: public_key.into(),
        }
    }
}

/// Agent registration payload.
///
/// A manifest is raw caller input; it becomes an
/// [`AgentRecord`](super::AgentRecord) only after validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentManifest {
    /// Caller-chosen agent identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Semantic version of the agent.
    pub version: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Ordered skill list.
    #[serde(default)]
    pub skills: Vec<SkillManifest>,
    /// Invocation endpoint.
    #[serde(default)]
    pub endpoint: String,
    /// Declared invocation protocol.
    pub protocol: Protocol,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional manifest signature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<ManifestSignature>,
}

impl AgentManifest {
    /// Creates a manifest with the required identity fields and no skills.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        endpoint: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            description: String::new(),
            skills: Vec::new(),
            endpoint: endpoint.into(),
            protocol,
            tags: Vec::new(),
            signature: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a skill.
    #[must_use]
    pub fn with_skill(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.skills.push(SkillManifest::new(name, description));
        self
    }

    /// Replaces the tag list.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Attaches a signature.
    #[must_use]
    pub fn with_signature(mut self, signature: ManifestSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    /// Returns the canonical bytes a manifest signature covers.
    ///
    /// The payload is compact JSON with lexicographically ordered keys over
    /// the identity, endpoint, protocol, skill names and descriptions, and
    /// the sorted tag set. Schemas and the signature itself are excluded.
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let tags: BTreeSet<String> = self
            .tags
            .iter()
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();
        let skills: Vec<Value> = self
            .skills
            .iter()
            .map(|skill| json!({ "name": skill.name.trim(), "description": skill.description.trim() }))
            .collect();
        let payload = json!({
            "id": self.id.trim(),
            "name": self.name.trim(),
            "version": self.version.trim(),
            "description": self.description.trim(),
            "endpoint": self.endpoint.trim(),
            "protocol": self.protocol.as_str(),
            "skills": skills,
            "tags": tags,
        });
        payload.to_string().into_bytes()
    }
}
