//! End-to-end registry flows over in-memory storage.

use super::helpers::{TestRegistry, agent_id, manifest, registry};
use agentmesh::agent::domain::{
    AgentRecord, AgentUpdate, HealthStatus, Protocol, RegistryEventKind,
};
use agentmesh::discovery::domain::DiscoveryQuery;
use agentmesh::registry::domain::{ApiEnvelope, ListQuery, RegistryError};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::json;

fn ids(records: &[AgentRecord]) -> Vec<&str> {
    records.iter().map(|record| record.id().as_str()).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn discovery_composes_filters(registry: TestRegistry) {
    registry
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &["utility"]))
        .await
        .expect("register a1");
    registry
        .register(manifest("a2", Protocol::Mcp, "http://127.0.0.1:9/mcp", &["utility"]))
        .await
        .expect("register a2");
    registry
        .register(manifest("a3", Protocol::Http, "http://127.0.0.1:9/", &["search"]))
        .await
        .expect("register a3");
    registry
        .heartbeat(&agent_id("a1"), HealthStatus::Healthy, None)
        .await
        .expect("heartbeat a1");

    let all = registry.discover(&DiscoveryQuery::new().with_skill("echo"));
    let healthy = registry.discover(&DiscoveryQuery::new().with_skill("echo").healthy_only(true));
    let http_utility = registry.discover(
        &DiscoveryQuery::new()
            .with_protocol(Protocol::Http)
            .with_tag("utility"),
    );

    assert_eq!(all.len(), 3);
    assert_eq!(ids(&healthy), vec!["a1"]);
    assert!(healthy.iter().all(|record| all.contains(record)));
    assert_eq!(ids(&http_utility), vec!["a1"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn events_follow_the_agent_lifecycle(registry: TestRegistry) {
    let mut events = registry.events().subscribe();
    let id = registry
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("register");
    registry
        .update(&id, &AgentUpdate::new().with_name("Renamed"))
        .await
        .expect("update");
    registry
        .heartbeat(&id, HealthStatus::Healthy, None)
        .await
        .expect("heartbeat");

    let kinds: Vec<RegistryEventKind> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|event| event.kind())
        .collect();

    assert_eq!(
        kinds.first(),
        Some(&RegistryEventKind::AgentRegistered)
    );
    assert!(kinds.contains(&RegistryEventKind::AgentUpdated));
    assert!(kinds.contains(&RegistryEventKind::AgentHealthChanged));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleted_agents_vanish_from_every_read(registry: TestRegistry) {
    let id = registry
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &["utility"]))
        .await
        .expect("register");

    registry.delete(&id).await.expect("delete");

    assert!(registry.list(&ListQuery::new()).is_empty());
    assert!(registry.search("agent", 10).is_empty());
    assert_eq!(registry.batch_health(&[id.clone()]), vec![(id, None)]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn envelopes_wrap_registry_outcomes(registry: TestRegistry) {
    let clock = DefaultClock;
    let id = registry
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("register");

    let found = ApiEnvelope::from_result(registry.get(&id).map(|record| record.id().clone()), &clock);
    let missing = ApiEnvelope::from_result(registry.get(&agent_id("ghost")), &clock);

    assert_eq!(
        serde_json::to_value(&found)
            .expect("serialize")
            .get("data"),
        Some(&json!("a1"))
    );
    let body = serde_json::to_value(&missing).expect("serialize");
    assert_eq!(body.get("success"), Some(&json!(false)));
    assert_eq!(body.get("error"), Some(&json!("not_found")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registration_conflicts_surface_as_duplicates(registry: TestRegistry) {
    registry
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("register");

    let second = registry
        .register(manifest("a1", Protocol::Mcp, "http://127.0.0.1:9/mcp", &[]))
        .await;

    assert!(matches!(second, Err(RegistryError::DuplicateId(_))));
    assert_eq!(
        registry.get(&agent_id("a1")).expect("first kept").protocol(),
        Protocol::Http
    );
}
