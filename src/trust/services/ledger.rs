//! Per-agent trust state and score computation.
#![expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "trust scores are weighted floating-point ratios"
)]

use crate::trust::domain::{TrustBreakdown, TrustConfig, TrustEvent, TrustEventKind, TrustScore};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

/// Neutral value of every sub-score and of a fresh composite.
pub(crate) const NEUTRAL: f64 = 0.5;

/// Score movements below this size are not recorded as decay events.
const CHANGE_EPSILON: f64 = 1e-4;

/// Upper bound on retained heartbeat timestamps per agent.
const MAX_TRACKED_HEARTBEATS: usize = 1024;

/// Mutable trust state of one agent.
#[derive(Debug, Clone)]
pub(crate) struct TrustLedger {
    successes: f64,
    failures: f64,
    latency_ewma_ms: Option<f64>,
    heartbeats: VecDeque<DateTime<Utc>>,
    heartbeat_seen: bool,
    tracked_since: DateTime<Utc>,
    last_activity: DateTime<Utc>,
    unhealthy: bool,
    breakdown: TrustBreakdown,
    score: f64,
    updated_at: DateTime<Utc>,
    history: VecDeque<TrustEvent>,
}

impl TrustLedger {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self {
            successes: 0.0,
            failures: 0.0,
            latency_ewma_ms: None,
            heartbeats: VecDeque::new(),
            heartbeat_seen: false,
            tracked_since: now,
            last_activity: now,
            unhealthy: false,
            breakdown: TrustBreakdown {
                availability: NEUTRAL,
                reliability: NEUTRAL,
                performance: NEUTRAL,
            },
            score: NEUTRAL,
            updated_at: now,
            history: VecDeque::new(),
        }
    }

    pub(crate) const fn score(&self) -> f64 {
        self.score
    }

    pub(crate) const fn snapshot(&self) -> TrustScore {
        TrustScore {
            score: self.score,
            breakdown: self.breakdown,
            penalized: self.unhealthy,
            updated_at: self.updated_at,
        }
    }

    pub(crate) fn history(&self, limit: usize) -> Vec<TrustEvent> {
        let skip = self.history.len().saturating_sub(limit);
        self.history.iter().skip(skip).copied().collect()
    }

    pub(crate) fn is_idle(&self, now: DateTime<Utc>, window: Duration) -> bool {
        elapsed(self.last_activity, now) > window
    }

    /// Applies one observation and returns the recorded event.
    ///
    /// Decay steps that move the score by less than [`CHANGE_EPSILON`] are
    /// applied but not recorded.
    pub(crate) fn apply(
        &mut self,
        kind: TrustEventKind,
        magnitude: Option<f64>,
        now: DateTime<Utc>,
        config: &TrustConfig,
    ) -> Option<TrustEvent> {
        let previous = self.score;
        match kind {
            TrustEventKind::Success => {
                self.successes += 1.0;
                self.observe_latency(magnitude, config);
                self.last_activity = now;
            }
            TrustEventKind::Failure => {
                self.failures += 1.0;
                // A failed call never counts as faster than the reference.
                let slowest = magnitude.map(|value| value.max(config.reference_latency_ms));
                self.observe_latency(slowest, config);
                self.last_activity = now;
            }
            TrustEventKind::Heartbeat => {
                self.heartbeats.push_back(now);
                while self.heartbeats.len() > MAX_TRACKED_HEARTBEATS {
                    self.heartbeats.pop_front();
                }
                self.heartbeat_seen = true;
                self.last_activity = now;
            }
            TrustEventKind::Decay => {
                let fraction = magnitude
                    .filter(|value| value.is_finite())
                    .map_or(config.decay_factor, |value| value.clamp(0.0, 1.0));
                self.decay(fraction, config);
            }
        }

        self.recompute(now, config);
        let delta = self.score - previous;
        if kind == TrustEventKind::Decay && delta.abs() < CHANGE_EPSILON {
            return None;
        }

        let event = TrustEvent::new(now, kind, delta, self.score);
        self.history.push_back(event);
        while self.history.len() > config.history_capacity {
            self.history.pop_front();
        }
        Some(event)
    }

    /// Toggles the unhealthy penalty, returning the previous score when the
    /// composite moved.
    pub(crate) fn set_unhealthy(
        &mut self,
        unhealthy: bool,
        now: DateTime<Utc>,
        config: &TrustConfig,
    ) -> Option<f64> {
        if self.unhealthy == unhealthy {
            return None;
        }
        let previous = self.score;
        self.unhealthy = unhealthy;
        self.recompute(now, config);
        ((self.score - previous).abs() >= f64::EPSILON).then_some(previous)
    }

    fn observe_latency(&mut self, magnitude: Option<f64>, config: &TrustConfig) {
        let Some(sample) = magnitude.filter(|value| value.is_finite() && *value >= 0.0) else {
            return;
        };
        let alpha = config.latency_smoothing;
        self.latency_ewma_ms = Some(
            self.latency_ewma_ms
                .map_or(sample, |average| alpha * sample + (1.0 - alpha) * average),
        );
    }

    fn decay(&mut self, fraction: f64, config: &TrustConfig) {
        let keep = 1.0 - fraction;
        self.successes *= keep;
        self.failures *= keep;
        let reference = config.reference_latency_ms;
        self.latency_ewma_ms = self
            .latency_ewma_ms
            .map(|average| reference + (average - reference) * keep);
    }

    fn recompute(&mut self, now: DateTime<Utc>, config: &TrustConfig) {
        let breakdown = TrustBreakdown {
            availability: self.availability(now, config),
            reliability: (self.successes + 1.0) / (self.successes + self.failures + 2.0),
            performance: self.performance(config),
        };
        let weights = config.weights;
        let mut composite = weights.availability() * breakdown.availability
            + weights.reliability() * breakdown.reliability
            + weights.performance() * breakdown.performance;
        if self.unhealthy {
            composite *= config.unhealthy_penalty;
        }
        self.score = if composite.is_finite() {
            composite.clamp(0.0, 1.0)
        } else {
            NEUTRAL
        };
        self.breakdown = breakdown;
        self.updated_at = now;
    }

    fn availability(&self, now: DateTime<Utc>, config: &TrustConfig) -> f64 {
        if !self.heartbeat_seen {
            return NEUTRAL;
        }
        let window = config.availability_window;
        let observed = self
            .heartbeats
            .iter()
            .filter(|beat| elapsed(**beat, now) <= window)
            .count();
        let span = elapsed(self.tracked_since, now)
            .min(window)
            .max(config.expected_heartbeat_interval);
        let expected = span.as_secs_f64() / config.expected_heartbeat_interval.as_secs_f64();
        (observed as f64 / expected).clamp(0.0, 1.0)
    }

    fn performance(&self, config: &TrustConfig) -> f64 {
        self.latency_ewma_ms.map_or(NEUTRAL, |average| {
            config.reference_latency_ms / (config.reference_latency_ms + average)
        })
    }
}

/// Time from `since` to `now`, zero when `since` lies in the future.
fn elapsed(since: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - since).to_std().unwrap_or_default()
}
