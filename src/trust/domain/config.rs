//! Trust scoring configuration.

use super::TrustConfigError;
use std::time::Duration;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Relative weights of the three trust sub-scores.
///
/// Weights are each in `[0, 1]` and sum to `1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrustWeights {
    availability: f64,
    reliability: f64,
    performance: f64,
}

impl TrustWeights {
    /// Creates validated weights.
    ///
    /// # Errors
    ///
    /// Returns [`TrustConfigError::WeightOutOfRange`] when a weight is not a
    /// finite value in `[0, 1]`, or [`TrustConfigError::WeightsDoNotSumToOne`]
    /// when the weights do not sum to `1.0`.
    #[expect(
        clippy::float_arithmetic,
        reason = "weights are validated by summing floating-point values"
    )]
    pub fn new(
        availability: f64,
        reliability: f64,
        performance: f64,
    ) -> Result<Self, TrustConfigError> {
        for (name, value) in [
            ("availability", availability),
            ("reliability", reliability),
            ("performance", performance),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(TrustConfigError::WeightOutOfRange { name, value });
            }
        }

        let sum = availability + reliability + performance;
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(TrustConfigError::WeightsDoNotSumToOne(sum));
        }

        Ok(Self {
            availability,
            reliability,
            performance,
        })
    }

    /// Returns the availability weight.
    #[must_use]
    pub const fn availability(&self) -> f64 {
        self.availability
    }

    /// Returns the reliability weight.
    #[must_use]
    pub const fn reliability(&self) -> f64 {
        self.reliability
    }

    /// Returns the performance weight.
    #[must_use]
    pub const fn performance(&self) -> f64 {
        self.performance
    }
}

impl Default for TrustWeights {
    fn default() -> Self {
        Self {
            availability: 0.4,
            reliability: 0.4,
            performance: 0.2,
        }
    }
}

/// Tunables for the trust engine.
///
/// # Examples
///
/// ```
/// use agentmesh::trust::domain::TrustConfig;
///
/// let config = TrustConfig::default();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.history_capacity, 50);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TrustConfig {
    /// Sub-score weights.
    pub weights: TrustWeights,
    /// Multiplier applied to the composite while the agent is unhealthy.
    pub unhealthy_penalty: f64,
    /// Fraction of the distance to neutral removed by one decay step.
    pub decay_factor: f64,
    /// Idle time after which [`decay_idle`] pulls a score toward neutral.
    ///
    /// [`decay_idle`]: crate::trust::services::TrustManager::decay_idle
    pub decay_window: Duration,
    /// Rolling window over which heartbeat regularity is measured.
    pub availability_window: Duration,
    /// Heartbeat period an always-available agent is expected to keep.
    pub expected_heartbeat_interval: Duration,
    /// Latency, in milliseconds, that maps to a neutral performance score.
    pub reference_latency_ms: f64,
    /// Weight of the newest sample in the latency moving average.
    pub latency_smoothing: f64,
    /// Maximum trust events retained per agent.
    pub history_capacity: usize,
}

impl Default for TrustConfig {
    fn default() -> Self {
        Self {
            weights: TrustWeights::default(),
            unhealthy_penalty: 0.5,
            decay_factor: 0.1,
            decay_window: Duration::from_secs(60 * 60),
            availability_window: Duration::from_secs(10 * 60),
            expected_heartbeat_interval: Duration::from_secs(30),
            reference_latency_ms: 1000.0,
            latency_smoothing: 0.3,
            history_capacity: 50,
        }
    }
}

impl TrustConfig {
    /// Checks every tunable is within its domain.
    ///
    /// # Errors
    ///
    /// Returns the [`TrustConfigError`] for the first out-of-range value.
    pub fn validate(&self) -> Result<(), TrustConfigError> {
        TrustWeights::new(
            self.weights.availability,
            self.weights.reliability,
            self.weights.performance,
        )?;
        for (name, value) in [
            ("unhealthy_penalty", self.unhealthy_penalty),
            ("decay_factor", self.decay_factor),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(TrustConfigError::FractionOutOfRange { name, value });
            }
        }
        if !self.latency_smoothing.is_finite()
            || self.latency_smoothing <= 0.0
            || self.latency_smoothing > 1.0
        {
            return Err(TrustConfigError::FractionOutOfRange {
                name: "latency_smoothing",
                value: self.latency_smoothing,
            });
        }
        if !self.reference_latency_ms.is_finite() || self.reference_latency_ms <= 0.0 {
            return Err(TrustConfigError::NonPositiveReferenceLatency(
                self.reference_latency_ms,
            ));
        }
        if self.availability_window.is_zero() || self.expected_heartbeat_interval.is_zero() {
            return Err(TrustConfigError::ZeroWindow);
        }
        if self.history_capacity == 0 {
            return Err(TrustConfigError::ZeroHistoryCapacity);
        }
        Ok(())
    }
}
