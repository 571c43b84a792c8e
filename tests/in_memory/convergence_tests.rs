//! Several registries converging over one shared storage backend.

use std::sync::Arc;
use std::time::Duration;

use super::helpers::{manifest, registry_over, storage};
use agentmesh::agent::adapters::memory::InMemoryStorage;
use agentmesh::agent::domain::{AgentUpdate, Protocol};
use rstest::rstest;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn registrations_propagate_between_instances(storage: Arc<InMemoryStorage>) {
    let first = registry_over(&storage);
    let second = registry_over(&storage);

    let id = first
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("register on first instance");
    let report = second.converge().await.expect("converge second instance");

    assert_eq!(report.added, 1);
    assert_eq!(second.get(&id).expect("propagated").name(), "Agent a1");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn latest_write_wins_across_instances(storage: Arc<InMemoryStorage>) {
    let first = registry_over(&storage);
    let second = registry_over(&storage);
    let id = first
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("register");
    second.converge().await.expect("initial convergence");

    tokio::time::sleep(Duration::from_millis(5)).await;
    second
        .update(&id, &AgentUpdate::new().with_name("Written by second"))
        .await
        .expect("update on second instance");
    first.converge().await.expect("converge first instance");

    assert_eq!(
        first.get(&id).expect("agent present").name(),
        "Written by second"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outage_writes_reach_storage_after_recovery(storage: Arc<InMemoryStorage>) {
    let writer = registry_over(&storage);
    storage.set_available(false);
    let id = writer
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("write should be queued");
    assert!(writer.converge().await.is_err());
    assert!(writer.is_degraded());

    storage.set_available(true);
    writer.converge().await.expect("converge after recovery");
    let reader = registry_over(&storage);
    let loaded = reader.load().await.expect("load");

    assert_eq!(loaded, 1);
    assert!(reader.get(&id).is_ok());
    assert!(!writer.is_degraded());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deletions_propagate_between_instances(storage: Arc<InMemoryStorage>) {
    let first = registry_over(&storage);
    let second = registry_over(&storage);
    let id = first
        .register(manifest("a1", Protocol::Http, "http://127.0.0.1:9/", &[]))
        .await
        .expect("register");
    second.converge().await.expect("initial convergence");

    first.delete(&id).await.expect("delete on first instance");
    tokio::time::sleep(Duration::from_millis(5)).await;
    let report = second.converge().await.expect("converge second instance");

    assert_eq!(report.removed, 1);
    assert!(second.get(&id).is_err());
}
