//! Unit tests for trust scoring.
#![expect(clippy::float_arithmetic, reason = "scores are compared with a tolerance")]

use std::sync::Arc;

use chrono::Duration;
use rstest::{fixture, rstest};

use crate::agent::domain::{AgentId, HealthStatus};
use crate::test_support::ManualClock;
use crate::trust::{
    domain::{TrustConfig, TrustConfigError, TrustEventKind, TrustWeights},
    services::TrustManager,
};

const TOLERANCE: f64 = 1e-9;

struct Harness {
    manager: TrustManager<ManualClock>,
    clock: Arc<ManualClock>,
    id: AgentId,
}

#[fixture]
fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new());
    let manager = TrustManager::new(TrustConfig::default(), Arc::clone(&clock))
        .expect("default config should be valid");
    let id = AgentId::new("agent-1").expect("valid id");
    manager.track(&id);
    Harness { manager, clock, id }
}

fn score(harness: &Harness) -> f64 {
    harness.manager.score_value(&harness.id)
}

// ── Configuration ───────────────────────────────────────────────────

#[rstest]
#[case(0.5, 0.5, 0.5)]
#[case(0.2, 0.2, 0.2)]
fn weights_must_sum_to_one(#[case] a: f64, #[case] r: f64, #[case] p: f64) {
    assert!(matches!(
        TrustWeights::new(a, r, p),
        Err(TrustConfigError::WeightsDoNotSumToOne(_))
    ));
}

#[rstest]
fn weights_reject_negative_values() {
    assert!(matches!(
        TrustWeights::new(-0.2, 0.6, 0.6),
        Err(TrustConfigError::WeightOutOfRange { name: "availability", .. })
    ));
}

#[rstest]
fn manager_rejects_invalid_config() {
    let config = TrustConfig {
        history_capacity: 0,
        ..TrustConfig::default()
    };
    let result = TrustManager::new(config, Arc::new(ManualClock::new()));
    assert!(matches!(result, Err(TrustConfigError::ZeroHistoryCapacity)));
}

// ── Scoring ─────────────────────────────────────────────────────────

#[rstest]
fn fresh_agents_start_neutral(harness: Harness) {
    let snapshot = harness
        .manager
        .score(&harness.id)
        .expect("agent should be tracked");
    assert!((snapshot.score - 0.5).abs() < TOLERANCE);
    assert!((snapshot.breakdown.reliability - 0.5).abs() < TOLERANCE);
    assert!(!snapshot.penalized);
}

#[rstest]
fn failures_strictly_lower_reliability(harness: Harness) {
    let mut previous = 0.5;
    for _ in 0..10 {
        harness
            .manager
            .apply(&harness.id, TrustEventKind::Failure, None)
            .expect("failure should be recorded");
        let reliability = harness
            .manager
            .score(&harness.id)
            .expect("agent should be tracked")
            .breakdown
            .reliability;
        assert!(reliability < previous, "{reliability} should be below {previous}");
        previous = reliability;
    }
}

#[rstest]
#[case::instant(0.0)]
#[case::short_deadline(50.0)]
#[case::slow(5_000.0)]
fn failures_never_raise_the_score(harness: Harness, #[case] latency_ms: f64) {
    let before = score(&harness);

    harness
        .manager
        .apply(&harness.id, TrustEventKind::Failure, Some(latency_ms))
        .expect("failure should be recorded");

    assert!(score(&harness) < before);
    let performance = harness
        .manager
        .score(&harness.id)
        .expect("agent should be tracked")
        .breakdown
        .performance;
    assert!(performance <= 0.5 + TOLERANCE);
}

#[rstest]
fn scores_stay_within_unit_interval(harness: Harness) {
    for _ in 0..200 {
        harness
            .manager
            .apply(&harness.id, TrustEventKind::Success, Some(0.0));
        harness.manager.apply(&harness.id, TrustEventKind::Heartbeat, None);
    }
    assert!((0.0..=1.0).contains(&score(&harness)));

    for _ in 0..400 {
        harness
            .manager
            .apply(&harness.id, TrustEventKind::Failure, Some(60_000.0));
    }
    harness
        .manager
        .observe_health(&harness.id, HealthStatus::Unhealthy);
    assert!((0.0..=1.0).contains(&score(&harness)));
}

#[rstest]
fn fast_successes_raise_performance(harness: Harness) {
    harness
        .manager
        .apply(&harness.id, TrustEventKind::Success, Some(100.0));
    let breakdown = harness
        .manager
        .score(&harness.id)
        .expect("agent should be tracked")
        .breakdown;
    assert!(breakdown.performance > 0.5);
    assert!(breakdown.reliability > 0.5);
}

#[rstest]
fn regular_heartbeats_saturate_availability(harness: Harness) {
    for _ in 0..5 {
        harness.manager.apply(&harness.id, TrustEventKind::Heartbeat, None);
        harness.clock.advance(Duration::seconds(30));
    }
    harness.manager.apply(&harness.id, TrustEventKind::Heartbeat, None);
    let availability = harness
        .manager
        .score(&harness.id)
        .expect("agent should be tracked")
        .breakdown
        .availability;
    assert!((availability - 1.0).abs() < TOLERANCE);
}

#[rstest]
fn unhealthy_status_halves_the_composite(harness: Harness) {
    let before = score(&harness);
    let change = harness
        .manager
        .observe_health(&harness.id, HealthStatus::Unhealthy)
        .expect("penalty should move the score");
    assert!((change.previous - before).abs() < TOLERANCE);
    assert!((change.current - before * 0.5).abs() < TOLERANCE);

    assert!(
        harness
            .manager
            .observe_health(&harness.id, HealthStatus::Unhealthy)
            .is_none()
    );
    let restored = harness
        .manager
        .observe_health(&harness.id, HealthStatus::Healthy)
        .expect("lifting the penalty should move the score");
    assert!((restored.current - before).abs() < TOLERANCE);
}

// ── Decay ───────────────────────────────────────────────────────────

#[rstest]
fn decay_on_neutral_score_is_a_noop(harness: Harness) {
    let before = score(&harness);
    let event = harness.manager.apply(&harness.id, TrustEventKind::Decay, None);
    assert!(event.is_none());
    assert!((score(&harness) - before).abs() < TOLERANCE);
    assert!(harness.manager.history(&harness.id, 10).is_empty());
}

#[rstest]
fn decay_pulls_scores_toward_neutral(harness: Harness) {
    for _ in 0..5 {
        harness
            .manager
            .apply(&harness.id, TrustEventKind::Failure, None);
    }
    let degraded = score(&harness);
    let event = harness
        .manager
        .apply(&harness.id, TrustEventKind::Decay, Some(0.5))
        .expect("decay should move a degraded score");
    assert!(event.delta() > 0.0);
    assert!(score(&harness) > degraded);
    assert!(score(&harness) < 0.5);
}

#[rstest]
fn decay_idle_only_touches_idle_agents(harness: Harness) {
    let busy = AgentId::new("agent-2").expect("valid id");
    harness.manager.apply(&harness.id, TrustEventKind::Failure, None);
    harness.clock.advance(Duration::hours(2));
    harness.manager.apply(&busy, TrustEventKind::Failure, None);

    let decayed = harness.manager.decay_idle();
    let ids: Vec<&AgentId> = decayed.iter().map(|(id, _)| id).collect();
    assert_eq!(ids, [&harness.id]);
}

// ── History ─────────────────────────────────────────────────────────

#[rstest]
fn history_is_bounded_and_evicts_oldest_first() {
    let clock = Arc::new(ManualClock::new());
    let config = TrustConfig {
        history_capacity: 3,
        ..TrustConfig::default()
    };
    let manager = TrustManager::new(config, Arc::clone(&clock)).expect("config should be valid");
    let id = AgentId::new("agent-1").expect("valid id");

    manager.apply(&id, TrustEventKind::Heartbeat, None);
    manager.apply(&id, TrustEventKind::Failure, None);
    manager.apply(&id, TrustEventKind::Success, None);
    manager.apply(&id, TrustEventKind::Failure, None);

    let kinds: Vec<TrustEventKind> = manager
        .history(&id, 10)
        .iter()
        .map(|event| event.kind())
        .collect();
    assert_eq!(
        kinds,
        [
            TrustEventKind::Failure,
            TrustEventKind::Success,
            TrustEventKind::Failure
        ]
    );
    assert_eq!(manager.history(&id, 1).len(), 1);
}

#[rstest]
fn remove_drops_history(harness: Harness) {
    harness.manager.apply(&harness.id, TrustEventKind::Success, None);
    assert!(harness.manager.remove(&harness.id));
    assert!(harness.manager.score(&harness.id).is_none());
    assert!(harness.manager.history(&harness.id, 10).is_empty());
    assert!((score(&harness) - 0.5).abs() < TOLERANCE);
}
