//! Partial updates to a registered agent.

use super::{AgentDomainError, HealthStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields a caller may change after registration.
///
/// Identity, version, protocol and skills are fixed at registration; changing
/// them requires deleting and re-registering the agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentUpdate {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New invocation endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Operator-set health status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    /// Replacement tag set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl AgentUpdate {
    /// Field names accepted in an update payload.
    pub const PERMITTED_FIELDS: [&'static str; 5] =
        ["name", "description", "endpoint", "health_status", "tags"];

    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an update from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::UnknownUpdateField`] naming the first field
    /// outside [`Self::PERMITTED_FIELDS`], or
    /// [`AgentDomainError::InvalidUpdate`] when the value is not an object or
    /// a field has the wrong type.
    pub fn from_json(value: &Value) -> Result<Self, AgentDomainError> {
        let Some(object) = value.as_object() else {
            return Err(AgentDomainError::InvalidUpdate(
                "expected a JSON object".to_owned(),
            ));
        };

        let mut unknown: Vec<&String> = object
            .keys()
            .filter(|key| !Self::PERMITTED_FIELDS.contains(&key.as_str()))
            .collect();
        unknown.sort();
        if let Some(field) = unknown.first() {
            return Err(AgentDomainError::UnknownUpdateField((*field).clone()));
        }

        serde_json::from_value(value.clone())
            .map_err(|err| AgentDomainError::InvalidUpdate(err.to_string()))
    }

    /// Sets the new display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the new endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the health status.
    #[must_use]
    pub const fn with_health_status(mut self, status: HealthStatus) -> Self {
        self.health_status = Some(status);
        self
    }

    /// Replaces the tag set.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.endpoint.is_none()
            && self.health_status.is_none()
            && self.tags.is_none()
    }
}
