//! Shared test helpers for in-memory registry integration tests.

use std::io;
use std::sync::Arc;

use agentmesh::agent::{
    adapters::{BroadcastEventBus, memory::InMemoryStorage},
    domain::{AgentId, AgentManifest, Protocol},
};
use agentmesh::config::RegistryConfig;
use agentmesh::registry::services::AgentRegistry;
use mockable::DefaultClock;
use rstest::fixture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Registry type used by the integration tests.
pub type TestRegistry = AgentRegistry<InMemoryStorage, BroadcastEventBus, DefaultClock>;

/// Provides a fresh storage backend for each test.
#[fixture]
pub fn storage() -> Arc<InMemoryStorage> {
    Arc::new(InMemoryStorage::new())
}

/// Builds a registry with default settings over `storage`.
///
/// # Panics
///
/// Panics when the default configuration is rejected.
#[must_use]
pub fn registry_over(storage: &Arc<InMemoryStorage>) -> TestRegistry {
    AgentRegistry::new(
        RegistryConfig::default(),
        Arc::clone(storage),
        Arc::new(BroadcastEventBus::default()),
        Arc::new(DefaultClock),
    )
    .expect("default registry config should be valid")
}

/// Provides a registry over a private storage backend.
#[fixture]
pub fn registry(storage: Arc<InMemoryStorage>) -> TestRegistry {
    registry_over(&storage)
}

/// Manifest with an `echo` skill and the given tags.
#[must_use]
pub fn manifest(id: &str, protocol: Protocol, endpoint: &str, tags: &[&str]) -> AgentManifest {
    AgentManifest::new(id, format!("Agent {id}"), "1.0.0", endpoint, protocol)
        .with_description("Agent used by integration tests")
        .with_skill("echo", "Returns the payload unchanged")
        .with_tags(tags.iter().copied())
}

/// Parses an agent identifier.
///
/// # Panics
///
/// Panics when `value` is not a valid identifier.
#[must_use]
pub fn agent_id(value: &str) -> AgentId {
    AgentId::new(value).expect("valid agent id")
}

/// Loopback listener running a canned behaviour until dropped.
pub struct Loopback {
    /// `host:port` the listener is bound to.
    pub addr: String,
    task: JoinHandle<()>,
}

impl Loopback {
    /// Base HTTP URL of the listener.
    #[must_use]
    pub fn http_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Accepts connections and never answers.
    ///
    /// # Errors
    ///
    /// Returns an error when no local port can be bound.
    pub async fn silent() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();
        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        Ok(Self { addr, task })
    }

    /// Answers every request with one fixed HTTP response.
    ///
    /// # Errors
    ///
    /// Returns an error when no local port can be bound.
    pub async fn responding(status_line: &'static str, body: &'static str) -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();
        let task = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = vec![0_u8; 8192];
                if socket.read(&mut request).await.is_err() {
                    continue;
                }
                let response = format!(
                    "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _written = socket.write_all(response.as_bytes()).await;
                let _closed = socket.shutdown().await;
            }
        });
        Ok(Self { addr, task })
    }

    /// Address nothing listens on.
    ///
    /// # Errors
    ///
    /// Returns an error when no local port can be bound.
    pub async fn closed_addr() -> io::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?.to_string();
        drop(listener);
        Ok(addr)
    }

    /// Wraps an already spawned server task.
    #[must_use]
    pub const fn from_task(addr: String, task: JoinHandle<()>) -> Self {
        Self { addr, task }
    }
}

impl Drop for Loopback {
    fn drop(&mut self) {
        self.task.abort();
    }
}
