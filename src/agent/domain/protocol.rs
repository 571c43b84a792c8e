//! Wire protocols agents may declare and their endpoint rules.

use super::{AgentDomainError, ParseProtocolError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Invocation protocol declared by an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Plain HTTP request/response.
    Http,
    /// Agent-defined HTTP dialect, dispatched like [`Protocol::Http`].
    Custom,
    /// Agent-to-agent JSON envelope over HTTP.
    A2a,
    /// Model Context Protocol JSON-RPC over HTTP.
    Mcp,
    /// Unary gRPC call.
    Grpc,
    /// Single request/response exchange over a WebSocket.
    Websocket,
}

impl Protocol {
    /// Every protocol, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::Http,
        Self::Custom,
        Self::A2a,
        Self::Mcp,
        Self::Grpc,
        Self::Websocket,
    ];

    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Custom => "custom",
            Self::A2a => "a2a",
            Self::Mcp => "mcp",
            Self::Grpc => "grpc",
            Self::Websocket => "websocket",
        }
    }

    fn accepts_endpoint(self, endpoint: &str) -> bool {
        let has_http_scheme = endpoint.starts_with("http://") || endpoint.starts_with("https://");
        let has_ws_scheme = endpoint.starts_with("ws://") || endpoint.starts_with("wss://");
        match self {
            Self::Http | Self::Custom | Self::A2a | Self::Mcp => has_http_scheme,
            Self::Websocket => has_http_scheme || has_ws_scheme,
            Self::Grpc => {
                has_http_scheme
                    || has_ws_scheme
                    || endpoint.starts_with("grpc://")
                    || endpoint.rsplit_once(':').is_some_and(|(host, port)| {
                        !host.is_empty() && port.parse::<u16>().is_ok()
                    })
            }
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Protocol {
    type Error = ParseProtocolError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|protocol| protocol.as_str() == normalized)
            .ok_or_else(|| ParseProtocolError(value.to_owned()))
    }
}

/// Invocation endpoint validated against a [`Protocol`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Creates an endpoint after checking it suits `protocol`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::MissingEndpoint`] when the value is empty
    /// after trimming, or [`AgentDomainError::InvalidEndpoint`] when it
    /// contains whitespace or lacks a scheme the protocol understands.
    pub fn new(value: impl Into<String>, protocol: Protocol) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(AgentDomainError::MissingEndpoint);
        }

        if normalized.chars().any(char::is_whitespace) || !protocol.accepts_endpoint(normalized) {
            return Err(AgentDomainError::InvalidEndpoint {
                endpoint: raw,
                protocol,
            });
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the endpoint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
