//! Given steps for agent registry BDD scenarios.

use super::world::{RegistryWorld, SilentEndpoint, build_manifest, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;

#[given(r#"an agent "{id}" with skill "{skill}" is registered"#)]
fn agent_registered(world: &mut RegistryWorld, id: String, skill: String) -> Result<(), eyre::Report> {
    let manifest = build_manifest(&id, &skill, "http://127.0.0.1:9/");
    let agent = run_async(world.registry.register(manifest)).wrap_err("register agent")?;
    world.agent = Some(agent);
    Ok(())
}

#[given(r#"an agent "{id}" with skill "{skill}" behind an endpoint that never responds"#)]
fn agent_behind_silent_endpoint(
    world: &mut RegistryWorld,
    id: String,
    skill: String,
) -> Result<(), eyre::Report> {
    let endpoint = run_async(SilentEndpoint::bind()).wrap_err("bind silent endpoint")?;
    let manifest = build_manifest(&id, &skill, &endpoint.url);
    let agent = run_async(world.registry.register(manifest)).wrap_err("register agent")?;
    world.agent = Some(agent);
    world.endpoint = Some(endpoint);
    Ok(())
}
