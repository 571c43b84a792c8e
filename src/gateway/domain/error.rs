//! Gateway error types.

use crate::agent::domain::Protocol;
use std::time::Duration;
use thiserror::Error;

/// Failure to dispatch an invocation or a non-successful remote outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request cannot be dispatched as given.
    #[error("invalid invocation request: {0}")]
    InvalidRequest(String),

    /// The bridge for the protocol cannot run in this build or configuration.
    #[error("{protocol} bridge unavailable: requires {dependency}")]
    BridgeUnavailable {
        /// Protocol whose bridge is missing.
        protocol: Protocol,
        /// What the bridge needs to run.
        dependency: String,
    },

    /// The remote did not answer within the deadline.
    #[error("invocation of {target} timed out after {}ms", .timeout.as_millis())]
    Timeout {
        /// Resolved target.
        target: String,
        /// Deadline that expired.
        timeout: Duration,
    },

    /// The remote answered with a failure.
    #[error("remote {target} answered with status {status}")]
    RemoteError {
        /// Resolved target.
        target: String,
        /// Status code reported by the remote.
        status: u16,
        /// Response body, preserved verbatim.
        body: String,
    },

    /// No connection could be established.
    #[error("target {target} unreachable: {reason}")]
    TargetUnreachable {
        /// Resolved target.
        target: String,
        /// Transport failure description.
        reason: String,
    },
}

impl GatewayError {
    /// Returns whether the failure reflects on the remote agent's behaviour.
    ///
    /// Caller mistakes and missing local bridges do not.
    #[must_use]
    pub const fn affects_trust(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::RemoteError { .. } | Self::TargetUnreachable { .. }
        )
    }

    pub(crate) fn bridge_unavailable(protocol: Protocol, dependency: impl Into<String>) -> Self {
        Self::BridgeUnavailable {
            protocol,
            dependency: dependency.into(),
        }
    }

    pub(crate) fn unreachable(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::TargetUnreachable {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

/// Error returned when parsing an HTTP method fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct ParseHttpMethodError(pub String);
