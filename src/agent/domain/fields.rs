//! Normalization rules shared by manifests and updates.

use super::AgentDomainError;
use std::collections::BTreeSet;

const MAX_NAME_CHARS: usize = 100;
const MAX_VERSION_CHARS: usize = 20;
const MAX_DESCRIPTION_CHARS: usize = 1000;
const MAX_TAG_CHARS: usize = 50;

pub(super) fn normalize_name(value: &str) -> Result<String, AgentDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AgentDomainError::EmptyName);
    }
    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(AgentDomainError::NameTooLong(value.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(super) fn normalize_version(value: &str) -> Result<String, AgentDomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AgentDomainError::EmptyVersion);
    }
    if trimmed.chars().count() > MAX_VERSION_CHARS {
        return Err(AgentDomainError::VersionTooLong(value.to_owned()));
    }
    Ok(trimmed.to_owned())
}

pub(super) fn normalize_description(value: &str) -> Result<String, AgentDomainError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(AgentDomainError::DescriptionTooLong);
    }
    Ok(trimmed.to_owned())
}

/// Lowercases and trims tags, dropping blanks and duplicates.
pub(super) fn normalize_tags<I, S>(values: I) -> Result<BTreeSet<String>, AgentDomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tags = BTreeSet::new();
    for value in values {
        let normalized = value.as_ref().trim().to_lowercase();
        if normalized.is_empty() {
            continue;
        }
        if normalized.chars().count() > MAX_TAG_CHARS {
            return Err(AgentDomainError::TagTooLong(normalized));
        }
        tags.insert(normalized);
    }
    Ok(tags)
}
