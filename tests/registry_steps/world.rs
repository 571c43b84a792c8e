//! Shared world state for agent registry BDD scenarios.

use std::sync::Arc;

use agentmesh::agent::{
    adapters::{BroadcastEventBus, memory::InMemoryStorage},
    domain::{AgentId, AgentManifest, AgentRecord, Protocol},
};
use agentmesh::config::RegistryConfig;
use agentmesh::gateway::domain::InvocationResult;
use agentmesh::registry::{domain::RegistryResult, services::AgentRegistry};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Registry type used by the BDD world.
pub type TestRegistry = AgentRegistry<InMemoryStorage, BroadcastEventBus, DefaultClock>;

/// Loopback listener that accepts connections and never answers.
pub struct SilentEndpoint {
    /// Base URL of the listener.
    pub url: String,
    task: JoinHandle<()>,
}

impl SilentEndpoint {
    /// Binds an ephemeral port and starts accepting.
    pub async fn bind() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = format!("http://{}/", listener.local_addr()?);
        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Ok(Self { url, task })
    }
}

impl Drop for SilentEndpoint {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Scenario world for agent registry behaviour tests.
pub struct RegistryWorld {
    /// The registry under test.
    pub registry: TestRegistry,
    /// Agent the scenario acts on.
    pub agent: Option<AgentId>,
    /// Ids returned by the last discovery query.
    pub discovered: Vec<AgentId>,
    /// Trust score captured before an invocation.
    pub trust_before: Option<f64>,
    /// Result of the last invocation.
    pub last_invocation: Option<RegistryResult<InvocationResult>>,
    /// Results of concurrently issued updates.
    pub concurrent_updates: Vec<RegistryResult<AgentRecord>>,
    /// Endpoint kept alive for the scenario.
    pub endpoint: Option<SilentEndpoint>,
}

impl RegistryWorld {
    /// Creates a world around an empty registry.
    ///
    /// # Panics
    ///
    /// Panics when the default configuration is rejected.
    #[must_use]
    pub fn new() -> Self {
        let registry = AgentRegistry::new(
            RegistryConfig::default(),
            Arc::new(InMemoryStorage::new()),
            Arc::new(BroadcastEventBus::default()),
            Arc::new(DefaultClock),
        )
        .expect("default registry config should be valid");
        Self {
            registry,
            agent: None,
            discovered: Vec::new(),
            trust_before: None,
            last_invocation: None,
            concurrent_updates: Vec::new(),
            endpoint: None,
        }
    }

    /// Returns the agent the scenario registered.
    pub fn agent(&self) -> Result<&AgentId, eyre::Report> {
        self.agent
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no agent registered in scenario world"))
    }
}

impl Default for RegistryWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> RegistryWorld {
    RegistryWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Builds an HTTP agent manifest declaring one skill.
pub fn build_manifest(id: &str, skill: &str, endpoint: &str) -> AgentManifest {
    AgentManifest::new(id, format!("Agent {id}"), "1.0.0", endpoint, Protocol::Http)
        .with_description("Agent used by behaviour tests")
        .with_skill(skill, "Skill used by behaviour tests")
}
