//! Gateway configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every protocol bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Deadline applied when a request does not carry one.
    pub default_timeout: Duration,
    /// Deadline for establishing HTTP connections.
    pub connect_timeout: Duration,
    /// `User-Agent` sent by the HTTP transport.
    pub user_agent: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("agentmesh/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
