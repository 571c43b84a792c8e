//! Background maintenance tasks.

use super::AgentRegistry;
use crate::agent::ports::{EventBus, StorageBackend};
use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Handle to the running health sweep, convergence and trust decay tasks.
///
/// Dropping the handle also stops the tasks once their current pass ends.
#[derive(Debug)]
pub struct RegistryTasks {
    shutdown: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl RegistryTasks {
    /// Signals every task to stop and waits for their current pass to
    /// finish.
    pub async fn shutdown(self) {
        self.shutdown.send_replace(true);
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "background task ended abnormally");
            }
        }
        info!("background tasks stopped");
    }
}

impl<S, E, C> AgentRegistry<S, E, C>
where
    S: StorageBackend + 'static,
    E: EventBus + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Spawns the periodic maintenance tasks on the current Tokio runtime.
    ///
    /// Each task waits one full interval before its first pass. A late tick
    /// delays the schedule instead of bursting.
    #[must_use]
    pub fn start(self: &Arc<Self>) -> RegistryTasks {
        let (shutdown, receiver) = watch::channel(false);

        let sweeper = Arc::clone(self);
        let sweep = spawn_periodic(
            "health_sweep",
            self.config.health.sweep_interval,
            receiver.clone(),
            move || {
                let registry = Arc::clone(&sweeper);
                async move {
                    let changes = registry.sweep().await;
                    if !changes.is_empty() {
                        debug!(stale = changes.len(), "sweep marked agents unhealthy");
                    }
                }
            },
        );

        let converger = Arc::clone(self);
        let converge = spawn_periodic(
            "convergence",
            self.config.convergence_interval,
            receiver.clone(),
            move || {
                let registry = Arc::clone(&converger);
                async move {
                    if let Err(err) = registry.converge().await {
                        warn!(error = %err, "convergence pass failed");
                    }
                }
            },
        );

        let decayer = Arc::clone(self);
        let decay = spawn_periodic(
            "trust_decay",
            self.config.decay_interval,
            receiver,
            move || {
                let registry = Arc::clone(&decayer);
                async move {
                    let decayed = registry.decay();
                    if decayed > 0 {
                        debug!(decayed, "idle trust scores decayed");
                    }
                }
            },
        );

        info!("background tasks started");
        RegistryTasks {
            shutdown,
            handles: vec![sweep, converge, decay],
        }
    }
}

fn spawn_periodic<F, Fut>(
    task: &'static str,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
    mut pass: F,
) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => pass().await,
            }
        }
        debug!(task, "background task stopped");
    })
}
