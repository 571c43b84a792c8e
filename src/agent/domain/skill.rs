//! Skills advertised by an agent.

use super::AgentDomainError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_SKILL_NAME_CHARS: usize = 100;
const MAX_SKILL_DESCRIPTION_CHARS: usize = 500;

/// A named capability an agent can be invoked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    name: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_schema: Option<Value>,
}

impl Skill {
    /// Creates a skill with a validated name and description.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptySkillName`],
    /// [`AgentDomainError::SkillNameTooLong`],
    /// [`AgentDomainError::EmptySkillDescription`] or
    /// [`AgentDomainError::SkillDescriptionTooLong`] when a field breaks its
    /// length rules.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, AgentDomainError> {
        let raw_name = name.into();
        let normalized_name = raw_name.trim();
        if normalized_name.is_empty() {
            return Err(AgentDomainError::EmptySkillName);
        }
        if normalized_name.chars().count() > MAX_SKILL_NAME_CHARS {
            return Err(AgentDomainError::SkillNameTooLong(raw_name));
        }

        let raw_description = description.into();
        let normalized_description = raw_description.trim();
        if normalized_description.is_empty() {
            return Err(AgentDomainError::EmptySkillDescription(
                normalized_name.to_owned(),
            ));
        }
        if normalized_description.chars().count() > MAX_SKILL_DESCRIPTION_CHARS {
            return Err(AgentDomainError::SkillDescriptionTooLong(
                normalized_name.to_owned(),
            ));
        }

        Ok(Self {
            name: normalized_name.to_owned(),
            description: normalized_description.to_owned(),
            input_schema: None,
            output_schema: None,
        })
    }

    /// Attaches a JSON schema describing accepted input.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }

    /// Attaches a JSON schema describing produced output.
    #[must_use]
    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Returns the skill name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the skill description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the optional input schema.
    #[must_use]
    pub const fn input_schema(&self) -> Option<&Value> {
        self.input_schema.as_ref()
    }

    /// Returns the optional output schema.
    #[must_use]
    pub const fn output_schema(&self) -> Option<&Value> {
        self.output_schema.as_ref()
    }
}
