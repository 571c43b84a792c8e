//! When steps for agent registry BDD scenarios.

use std::time::Duration;

use super::world::{RegistryWorld, run_async};
use agentmesh::agent::domain::{AgentUpdate, HealthStatus};
use agentmesh::discovery::domain::DiscoveryQuery;
use agentmesh::gateway::domain::InvocationRequest;
use rstest_bdd_macros::when;
use serde_json::json;

fn discover(world: &mut RegistryWorld, skill: &str, healthy_only: bool) {
    let query = DiscoveryQuery::new()
        .with_skill(skill)
        .healthy_only(healthy_only);
    world.discovered = world
        .registry
        .discover(&query)
        .iter()
        .map(|record| record.id().clone())
        .collect();
}

#[when(r#"agents with skill "{skill}" are discovered"#)]
fn discover_all(world: &mut RegistryWorld, skill: String) {
    discover(world, &skill, false);
}

#[when(r#"healthy agents with skill "{skill}" are discovered"#)]
fn discover_healthy(world: &mut RegistryWorld, skill: String) {
    discover(world, &skill, true);
}

#[when(r#"the agent reports an "{status}" heartbeat"#)]
fn report_heartbeat(world: &mut RegistryWorld, status: String) -> Result<(), eyre::Report> {
    let reported = HealthStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let agent = world.agent()?.clone();
    run_async(world.registry.heartbeat(&agent, reported, None))
        .map_err(|err| eyre::eyre!("heartbeat failed: {err}"))?;
    Ok(())
}

#[when("the agent is invoked with a {secs:u64} second timeout")]
fn invoke_with_timeout(world: &mut RegistryWorld, secs: u64) -> Result<(), eyre::Report> {
    let agent = world.agent()?.clone();
    world.trust_before = Some(world.registry.trust().score_value(&agent));
    let request = InvocationRequest::new(json!({"text": "hello"}))
        .with_skill("echo")
        .with_timeout(Duration::from_secs(secs));
    world.last_invocation = Some(run_async(world.registry.invoke(&agent, &request)));
    Ok(())
}

#[when("a rename and a description change run concurrently")]
fn concurrent_updates(world: &mut RegistryWorld) -> Result<(), eyre::Report> {
    let agent = world.agent()?.clone();
    let rename = AgentUpdate::new().with_name("Renamed agent");
    let describe = AgentUpdate::new().with_description("Changed concurrently");
    let (first, second) = run_async(async {
        tokio::join!(
            world.registry.update(&agent, &rename),
            world.registry.update(&agent, &describe),
        )
    });
    world.concurrent_updates = vec![first, second];
    Ok(())
}
