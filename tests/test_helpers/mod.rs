//! Scoped `AGENTMESH_*` environment for configuration tests.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

const PREFIX: &str = "AGENTMESH_";

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Holds the environment lock and restores every `AGENTMESH_*` variable on
/// drop.
pub struct EnvVarGuard {
    previous: Vec<(OsString, OsString)>,
    touched: Vec<OsString>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Clears every `AGENTMESH_*` variable, then applies `settings`.
    ///
    /// Variables set outside the test process cannot leak into the
    /// configuration under test.
    pub fn isolated(settings: &[(&str, &str)]) -> Self {
        let lock = env_lock();
        let previous: Vec<(OsString, OsString)> = env::vars_os()
            .filter(|(key, _)| key.to_string_lossy().starts_with(PREFIX))
            .collect();

        for (key, _) in &previous {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::remove_var(key);
            }
        }
        let mut touched = Vec::with_capacity(settings.len());
        for (key, value) in settings {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::set_var(key, value);
            }
            touched.push(OsString::from(key));
        }

        Self {
            previous,
            touched,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for key in self.touched.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::remove_var(&key);
            }
        }
        for (key, value) in self.previous.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                env::set_var(&key, &value);
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
