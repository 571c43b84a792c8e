//! Shared fixtures for unit tests.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::{Mutex, PoisonError};

use crate::agent::domain::{AgentManifest, Protocol};

/// Clock whose time only moves when a test advances it.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Starts the clock at a fixed instant.
    pub fn new() -> Self {
        let start = Utc
            .with_ymd_and_hms(2025, 1, 1, 12, 0, 0)
            .single()
            .expect("fixed start instant should be valid");
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, step: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += step;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Manifest for an HTTP agent with an `echo` skill.
pub fn echo_manifest(id: &str) -> AgentManifest {
    AgentManifest::new(id, "Echo agent", "1.0.0", "http://127.0.0.1:9/", Protocol::Http)
        .with_description("Repeats whatever it receives")
        .with_skill("echo", "Returns the payload unchanged")
        .with_tags(["utility", "Testing"])
}
