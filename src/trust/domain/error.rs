//! Trust configuration errors.

use thiserror::Error;

/// Errors returned when trust tunables are out of range.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrustConfigError {
    /// A sub-score weight is not a finite value in `[0, 1]`.
    #[error("trust weight '{name}' must be within [0, 1], got {value}")]
    WeightOutOfRange {
        /// Weight name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// The weights do not add up to one.
    #[error("trust weights must sum to 1.0, got {0}")]
    WeightsDoNotSumToOne(f64),

    /// A fractional tunable is not within its range.
    #[error("'{name}' must be a fraction within [0, 1], got {value}")]
    FractionOutOfRange {
        /// Tunable name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// The reference latency is zero, negative or not finite.
    #[error("reference latency must be positive, got {0}")]
    NonPositiveReferenceLatency(f64),

    /// The availability window or heartbeat interval is zero.
    #[error("availability window and heartbeat interval must be non-zero")]
    ZeroWindow,

    /// History retention is disabled.
    #[error("trust history capacity must be at least one event")]
    ZeroHistoryCapacity,
}
