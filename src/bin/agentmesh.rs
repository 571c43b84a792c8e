//! Runs a standalone agent registry over in-memory storage.
//!
//! Usage:
//!
//! ```text
//! RUST_LOG=agentmesh=debug agentmesh
//! ```
//!
//! Settings are read from `AGENTMESH_*` environment variables (see
//! [`agentmesh::config`]). The process runs the health sweep, convergence
//! and trust decay tasks until it receives Ctrl-C, then drains them and
//! exits.

use agentmesh::agent::adapters::{BroadcastEventBus, memory::InMemoryStorage};
use agentmesh::config::{ConfigError, RegistryConfig};
use agentmesh::registry::domain::RegistryError;
use agentmesh::registry::services::AgentRegistry;
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that stop the service before or while it runs.
#[derive(Debug, Error)]
enum ServeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("registry setup failed: {0}")]
    Registry(#[from] RegistryError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error("failed to wait for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    serve().map_err(Into::into)
}

fn serve() -> Result<(), ServeError> {
    let config = RegistryConfig::from_env()?;
    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ServeError::RuntimeInit)?;

    runtime.block_on(async move {
        let events = Arc::new(BroadcastEventBus::default());
        let registry = Arc::new(AgentRegistry::new(
            config,
            Arc::new(InMemoryStorage::new()),
            events,
            Arc::new(DefaultClock),
        )?);
        let loaded = registry.load().await?;
        info!(agents = loaded, "registry ready");

        let tasks = registry.start();
        let signal = tokio::signal::ctrl_c().await.map_err(ServeError::Signal);
        info!("shutting down");
        tasks.shutdown().await;
        signal
    })
}
