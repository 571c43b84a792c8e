//! JSON response envelope for transport layers.

use super::{ErrorKind, RegistryError};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Uniform wrapper around operation results.
///
/// Successful results carry `data`; failures carry the stable `error` kind
/// and a human-readable `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Operation output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Failure kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
    /// Human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the envelope was produced.
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiEnvelope<T> {
    /// Wraps a successful result.
    pub fn ok(data: T, clock: &impl Clock) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            timestamp: clock.utc(),
        }
    }

    /// Wraps a failure.
    pub fn from_error(err: &RegistryError, clock: &impl Clock) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.kind()),
            message: Some(err.to_string()),
            timestamp: clock.utc(),
        }
    }

    /// Wraps either outcome.
    pub fn from_result(result: Result<T, RegistryError>, clock: &impl Clock) -> Self {
        match result {
            Ok(data) => Self::ok(data, clock),
            Err(err) => Self::from_error(&err, clock),
        }
    }

    /// Attaches a message to a successful envelope.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
