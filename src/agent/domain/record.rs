//! Canonical agent record aggregate root.

use super::{
    AgentDomainError, AgentId, AgentManifest, AgentUpdate, Endpoint, HealthStatus,
    ManifestSignature, Protocol, Skill,
    fields::{normalize_description, normalize_name, normalize_tags, normalize_version},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet};

/// Identity and capability snapshot of a registered agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    id: AgentId,
    name: String,
    version: String,
    description: String,
    skills: Vec<Skill>,
    endpoint: Endpoint,
    protocol: Protocol,
    tags: BTreeSet<String>,
    health_status: HealthStatus,
    last_heartbeat: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signature: Option<ManifestSignature>,
}

/// Parameter object for reconstructing a stored agent record.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedAgentData {
    /// Stored identifier.
    pub id: AgentId,
    /// Stored display name.
    pub name: String,
    /// Stored version.
    pub version: String,
    /// Stored description.
    pub description: String,
    /// Stored skills.
    pub skills: Vec<Skill>,
    /// Stored endpoint.
    pub endpoint: Endpoint,
    /// Stored protocol.
    pub protocol: Protocol,
    /// Stored tags.
    pub tags: BTreeSet<String>,
    /// Stored health status.
    pub health_status: HealthStatus,
    /// Stored last heartbeat.
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Stored creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Stored latest modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Stored signature.
    pub signature: Option<ManifestSignature>,
}

impl AgentRecord {
    /// Validates a manifest and creates a record with `unknown` health.
    ///
    /// Signature verification is not performed here; the registry checks the
    /// signature before calling this constructor.
    ///
    /// # Errors
    ///
    /// Returns an [`AgentDomainError`] describing the first rule the manifest
    /// breaks.
    pub fn from_manifest(
        manifest: AgentManifest,
        clock: &impl Clock,
    ) -> Result<Self, AgentDomainError> {
        let AgentManifest {
            id,
            name,
            version,
            description,
            skills,
            endpoint,
            protocol,
            tags,
            signature,
        } = manifest;

        let agent_id = AgentId::new(id)?;
        let normalized_name = normalize_name(&name)?;
        let normalized_version = normalize_version(&version)?;
        let normalized_description = normalize_description(&description)?;

        if skills.is_empty() {
            return Err(AgentDomainError::NoSkills);
        }
        let mut seen = HashSet::with_capacity(skills.len());
        let mut validated_skills = Vec::with_capacity(skills.len());
        for entry in skills {
            let mut skill = Skill::new(entry.name, entry.description)?;
            if !seen.insert(skill.name().to_owned()) {
                return Err(AgentDomainError::DuplicateSkillName(skill.name().to_owned()));
            }
            if let Some(schema) = entry.input_schema {
                skill = skill.with_input_schema(schema);
            }
            if let Some(schema) = entry.output_schema {
                skill = skill.with_output_schema(schema);
            }
            validated_skills.push(skill);
        }

        let validated_endpoint = Endpoint::new(endpoint, protocol)?;
        let normalized_tags = normalize_tags(&tags)?;

        let timestamp = clock.utc();
        Ok(Self {
            id: agent_id,
            name: normalized_name,
            version: normalized_version,
            description: normalized_description,
            skills: validated_skills,
            endpoint: validated_endpoint,
            protocol,
            tags: normalized_tags,
            health_status: HealthStatus::Unknown,
            last_heartbeat: None,
            created_at: timestamp,
            updated_at: timestamp,
            signature,
        })
    }

    /// Reconstructs a record from storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAgentData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            version: data.version,
            description: data.description,
            skills: data.skills,
            endpoint: data.endpoint,
            protocol: data.protocol,
            tags: data.tags,
            health_status: data.health_status,
            last_heartbeat: data.last_heartbeat,
            created_at: data.created_at,
            updated_at: data.updated_at,
            signature: data.signature,
        }
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> &AgentId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the semantic version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the ordered skill list.
    #[must_use]
    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    /// Looks up a skill by name.
    #[must_use]
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|skill| skill.name() == name)
    }

    /// Returns the invocation endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Returns the declared protocol.
    #[must_use]
    pub const fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Returns the normalized tag set.
    #[must_use]
    pub const fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the last recorded health status.
    #[must_use]
    pub const fn health_status(&self) -> HealthStatus {
        self.health_status
    }

    /// Returns the last observed heartbeat.
    #[must_use]
    pub const fn last_heartbeat(&self) -> Option<DateTime<Utc>> {
        self.last_heartbeat
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the manifest signature, if any.
    #[must_use]
    pub const fn signature(&self) -> Option<&ManifestSignature> {
        self.signature.as_ref()
    }

    /// Applies a partial update and returns the changed fields.
    ///
    /// Every field is validated before any is written, so a rejected update
    /// leaves the record untouched. `updated_at` is bumped even when the
    /// supplied values equal the current ones.
    ///
    /// Changing a field covered by the manifest signature drops the
    /// signature, since it no longer verifies against the record.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptyUpdate`] when no field is set, or the
    /// validation error of the first invalid field.
    pub fn apply_update(
        &mut self,
        update: &AgentUpdate,
        clock: &impl Clock,
    ) -> Result<Map<String, Value>, AgentDomainError> {
        if update.is_empty() {
            return Err(AgentDomainError::EmptyUpdate);
        }

        let name = update.name.as_deref().map(normalize_name).transpose()?;
        let description = update
            .description
            .as_deref()
            .map(normalize_description)
            .transpose()?;
        let endpoint = update
            .endpoint
            .as_ref()
            .map(|value| Endpoint::new(value.as_str(), self.protocol))
            .transpose()?;
        let tags = update.tags.as_ref().map(normalize_tags).transpose()?;

        let mut changes = Map::new();
        if let Some(value) = name {
            changes.insert("name".to_owned(), Value::from(value.as_str()));
            self.name = value;
        }
        if let Some(value) = description {
            changes.insert("description".to_owned(), Value::from(value.as_str()));
            self.description = value;
        }
        if let Some(value) = endpoint {
            changes.insert("endpoint".to_owned(), Value::from(value.as_str()));
            self.endpoint = value;
        }
        if let Some(status) = update.health_status {
            changes.insert("health_status".to_owned(), Value::from(status.as_str()));
            self.health_status = status;
        }
        if let Some(value) = tags {
            changes.insert(
                "tags".to_owned(),
                Value::from(value.iter().cloned().collect::<Vec<_>>()),
            );
            self.tags = value;
        }
        let signed_field_changed = ["name", "description", "endpoint", "tags"]
            .iter()
            .any(|field| changes.contains_key(*field));
        if signed_field_changed && self.signature.take().is_some() {
            changes.insert("signature".to_owned(), Value::Null);
        }

        self.touch(clock);
        Ok(changes)
    }

    /// Records a heartbeat observed at `at` with the reported status.
    ///
    /// The stored heartbeat never moves backwards.
    pub fn record_heartbeat(
        &mut self,
        status: HealthStatus,
        at: DateTime<Utc>,
        clock: &impl Clock,
    ) {
        self.health_status = status;
        self.last_heartbeat = Some(self.last_heartbeat.map_or(at, |previous| previous.max(at)));
        self.touch(clock);
    }

    /// Overwrites the health status, for example after a staleness sweep.
    pub fn set_health_status(&mut self, status: HealthStatus, clock: &impl Clock) {
        self.health_status = status;
        self.touch(clock);
    }

    /// Advances `updated_at` to the clock time, never moving it backwards.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = self.updated_at.max(clock.utc());
    }
}
