//! Then steps for agent registry BDD scenarios.

use super::world::RegistryWorld;
use agentmesh::gateway::domain::GatewayError;
use agentmesh::registry::domain::RegistryError;
use agentmesh::trust::domain::TrustEventKind;
use rstest_bdd_macros::then;

#[then(r#"the discovery result is "{id}""#)]
fn discovery_result_is(world: &RegistryWorld, id: String) -> Result<(), eyre::Report> {
    let found: Vec<&str> = world.discovered.iter().map(|agent| agent.as_str()).collect();
    if found != [id.as_str()] {
        return Err(eyre::eyre!("expected [{id}], found {found:?}"));
    }
    Ok(())
}

#[then("the discovery result is empty")]
fn discovery_result_is_empty(world: &RegistryWorld) -> Result<(), eyre::Report> {
    if !world.discovered.is_empty() {
        return Err(eyre::eyre!(
            "expected no agents, found {:?}",
            world.discovered
        ));
    }
    Ok(())
}

#[then("the invocation fails with a timeout")]
fn invocation_times_out(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let outcome = world
        .last_invocation
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing invocation result in scenario world"))?;
    if !matches!(
        outcome,
        Err(RegistryError::Gateway(GatewayError::Timeout { .. }))
    ) {
        return Err(eyre::eyre!("expected a timeout, got {outcome:?}"));
    }
    Ok(())
}

#[then("a failure trust event is recorded")]
fn failure_event_recorded(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let agent = world.agent()?;
    let history = world
        .registry
        .trust_history(agent, 10)
        .map_err(|err| eyre::eyre!("trust history failed: {err}"))?;
    let last = history.last().map(|event| event.kind());
    if last != Some(TrustEventKind::Failure) {
        return Err(eyre::eyre!("expected a failure event, last was {last:?}"));
    }
    Ok(())
}

#[then("the trust score did not increase")]
fn trust_not_increased(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let agent = world.agent()?;
    let before = world
        .trust_before
        .ok_or_else(|| eyre::eyre!("trust score was not captured"))?;
    let after = world.registry.trust().score_value(agent);
    if after > before {
        return Err(eyre::eyre!("trust rose from {before} to {after}"));
    }
    Ok(())
}

#[then("both changes are applied")]
fn both_changes_applied(world: &RegistryWorld) -> Result<(), eyre::Report> {
    for outcome in &world.concurrent_updates {
        if let Err(err) = outcome {
            return Err(eyre::eyre!("concurrent update failed: {err}"));
        }
    }
    let record = world
        .registry
        .get(world.agent()?)
        .map_err(|err| eyre::eyre!("agent lookup failed: {err}"))?;
    if record.name() != "Renamed agent" || record.description() != "Changed concurrently" {
        return Err(eyre::eyre!(
            "lost update: name {:?}, description {:?}",
            record.name(),
            record.description()
        ));
    }
    Ok(())
}

#[then("the record's last update time is the later write")]
fn updated_at_is_latest(world: &RegistryWorld) -> Result<(), eyre::Report> {
    let latest = world
        .concurrent_updates
        .iter()
        .filter_map(|outcome| outcome.as_ref().ok())
        .map(|record| record.updated_at())
        .max()
        .ok_or_else(|| eyre::eyre!("no successful update recorded"))?;
    let record = world
        .registry
        .get(world.agent()?)
        .map_err(|err| eyre::eyre!("agent lookup failed: {err}"))?;
    if record.updated_at() != latest {
        return Err(eyre::eyre!(
            "expected updated_at {latest}, found {}",
            record.updated_at()
        ));
    }
    Ok(())
}
