//! Trust events and score snapshots.

use crate::agent::domain::AgentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Observation that moves a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustEventKind {
    /// An invocation completed successfully.
    Success,
    /// An invocation failed, timed out or was unreachable.
    Failure,
    /// A heartbeat was received.
    Heartbeat,
    /// Time-based pull toward the neutral baseline.
    Decay,
}

impl TrustEventKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Heartbeat => "heartbeat",
            Self::Decay => "decay",
        }
    }
}

impl fmt::Display for TrustEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only record of one applied trust observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustEvent {
    timestamp: DateTime<Utc>,
    kind: TrustEventKind,
    delta: f64,
    score: f64,
}

impl TrustEvent {
    /// Creates an event.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, kind: TrustEventKind, delta: f64, score: f64) -> Self {
        Self {
            timestamp,
            kind,
            delta,
            score,
        }
    }

    /// Returns when the event was applied.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the event kind.
    #[must_use]
    pub const fn kind(&self) -> TrustEventKind {
        self.kind
    }

    /// Returns the score change caused by the event.
    #[must_use]
    pub const fn delta(&self) -> f64 {
        self.delta
    }

    /// Returns the composite score after the event.
    #[must_use]
    pub const fn score(&self) -> f64 {
        self.score
    }
}

/// The three weighted components of a trust score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustBreakdown {
    /// Heartbeat regularity over the rolling window.
    pub availability: f64,
    /// Smoothed success ratio of invocations.
    pub reliability: f64,
    /// Inverse-normalized invocation latency.
    pub performance: f64,
}

/// Current trust score of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Composite score in `[0, 1]`.
    pub score: f64,
    /// Sub-scores the composite was computed from.
    pub breakdown: TrustBreakdown,
    /// Whether the unhealthy penalty is applied.
    pub penalized: bool,
    /// When the score was last recomputed.
    pub updated_at: DateTime<Utc>,
}

/// Score movement reported to the registry for notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreChange {
    /// Affected agent.
    pub agent_id: AgentId,
    /// Score before the change.
    pub previous: f64,
    /// Score after the change.
    pub current: f64,
}
