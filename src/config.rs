//! Registry configuration and environment overrides.
//!
//! [`RegistryConfig`] bundles the settings of every subsystem. Defaults are
//! suitable for a single local instance; [`RegistryConfig::from_env`] applies
//! `AGENTMESH_*` overrides on top of them.

use crate::gateway::domain::GatewayConfig;
use crate::health::domain::HealthConfig;
use crate::trust::domain::{TrustConfig, TrustConfigError, TrustWeights};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the health sweep interval, in seconds.
pub const SWEEP_INTERVAL_VAR: &str = "AGENTMESH_SWEEP_INTERVAL_SECS";
/// Environment variable overriding the staleness threshold, in seconds.
pub const STALENESS_THRESHOLD_VAR: &str = "AGENTMESH_STALENESS_THRESHOLD_SECS";
/// Environment variable overriding the convergence interval, in seconds.
pub const CONVERGENCE_INTERVAL_VAR: &str = "AGENTMESH_CONVERGENCE_INTERVAL_SECS";
/// Environment variable overriding the trust decay interval, in seconds.
pub const DECAY_INTERVAL_VAR: &str = "AGENTMESH_DECAY_INTERVAL_SECS";
/// Environment variable selecting the write policy, `queue` or `fail_fast`.
pub const WRITE_POLICY_VAR: &str = "AGENTMESH_WRITE_POLICY";
/// Environment variable requiring signed manifests, `true` or `false`.
pub const REQUIRE_SIGNATURES_VAR: &str = "AGENTMESH_REQUIRE_SIGNATURES";
/// Environment variable overriding trust weights as `availability,reliability,performance`.
pub const TRUST_WEIGHTS_VAR: &str = "AGENTMESH_TRUST_WEIGHTS";

/// What a write does when storage is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Keep the in-memory change and persist it on the next convergence
    /// cycle.
    #[default]
    Queue,
    /// Reject the write and leave every structure untouched.
    FailFast,
}

impl WritePolicy {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Queue => "queue",
            Self::FailFast => "fail_fast",
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for WritePolicy {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "queue" => Ok(Self::Queue),
            "fail_fast" => Ok(Self::FailFast),
            _ => Err(ConfigError::invalid(
                WRITE_POLICY_VAR,
                value,
                "expected `queue` or `fail_fast`",
            )),
        }
    }
}

/// Errors raised while building or validating configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A setting could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// An interval that drives a periodic task is zero.
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    /// Trust settings are inconsistent.
    #[error(transparent)]
    Trust(#[from] TrustConfigError),
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

/// Settings for a registry and the subsystems it owns.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryConfig {
    /// Liveness tracking.
    pub health: HealthConfig,
    /// Trust scoring.
    pub trust: TrustConfig,
    /// Protocol bridges.
    pub gateway: GatewayConfig,
    /// Period of the storage convergence task.
    pub convergence_interval: Duration,
    /// Period of the idle trust decay task.
    pub decay_interval: Duration,
    /// Behaviour of writes while storage is unavailable.
    pub write_policy: WritePolicy,
    /// Reject manifests without a valid signature.
    pub require_signatures: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            health: HealthConfig::default(),
            trust: TrustConfig::default(),
            gateway: GatewayConfig::default(),
            convergence_interval: Duration::from_secs(30),
            decay_interval: Duration::from_secs(60),
            write_policy: WritePolicy::Queue,
            require_signatures: false,
        }
    }
}

impl RegistryConfig {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is malformed or the result
    /// fails [`RegistryConfig::validate`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides supplied by `lookup` on top of the defaults.
    ///
    /// Unset and blank variables keep their default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is malformed or the result fails
    /// [`RegistryConfig::validate`].
    ///
    /// # Examples
    ///
    /// ```
    /// use agentmesh::config::{RegistryConfig, WritePolicy};
    ///
    /// let config = RegistryConfig::from_lookup(|key| match key {
    ///     "AGENTMESH_WRITE_POLICY" => Some("fail_fast".to_owned()),
    ///     _ => None,
    /// })
    /// .expect("overrides should be valid");
    /// assert_eq!(config.write_policy, WritePolicy::FailFast);
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = read(SWEEP_INTERVAL_VAR) {
            config.health.sweep_interval = parse_secs(SWEEP_INTERVAL_VAR, &value)?;
        }
        if let Some(value) = read(STALENESS_THRESHOLD_VAR) {
            config.health.staleness_threshold = parse_secs(STALENESS_THRESHOLD_VAR, &value)?;
        }
        if let Some(value) = read(CONVERGENCE_INTERVAL_VAR) {
            config.convergence_interval = parse_secs(CONVERGENCE_INTERVAL_VAR, &value)?;
        }
        if let Some(value) = read(DECAY_INTERVAL_VAR) {
            config.decay_interval = parse_secs(DECAY_INTERVAL_VAR, &value)?;
        }
        if let Some(value) = read(WRITE_POLICY_VAR) {
            config.write_policy = WritePolicy::try_from(value.as_str())?;
        }
        if let Some(value) = read(REQUIRE_SIGNATURES_VAR) {
            config.require_signatures = parse_bool(REQUIRE_SIGNATURES_VAR, &value)?;
        }
        if let Some(value) = read(TRUST_WEIGHTS_VAR) {
            config.trust.weights = parse_weights(&value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroInterval`] for a zero period or deadline
    /// and [`ConfigError::Trust`] for invalid trust settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("sweep interval", self.health.sweep_interval),
            ("staleness threshold", self.health.staleness_threshold),
            ("convergence interval", self.convergence_interval),
            ("decay interval", self.decay_interval),
            ("default invocation timeout", self.gateway.default_timeout),
        ];
        if let Some((name, _)) = intervals.iter().find(|(_, value)| value.is_zero()) {
            return Err(ConfigError::ZeroInterval(name));
        }
        self.trust.validate()?;
        Ok(())
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|err| ConfigError::invalid(key, value, err.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected a boolean")),
    }
}

fn parse_weights(value: &str) -> Result<TrustWeights, ConfigError> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ConfigError::invalid(TRUST_WEIGHTS_VAR, value, err.to_string()))?;
    let [availability, reliability, performance] = parts.as_slice() else {
        return Err(ConfigError::invalid(
            TRUST_WEIGHTS_VAR,
            value,
            "expected three comma-separated weights",
        ));
    };
    Ok(TrustWeights::new(*availability, *reliability, *performance)?)
}
