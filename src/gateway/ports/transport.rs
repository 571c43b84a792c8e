//! Transport ports used by the protocol bridges.
//!
//! Each port performs exactly one exchange and never retries. Deadlines are
//! passed through so adapters can enforce them natively; the gateway also
//! enforces them around the whole call.

use crate::gateway::domain::HttpMethod;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single transport exchange.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The exchange exceeded its deadline.
    #[error("transport deadline exceeded")]
    Timeout,

    /// No connection could be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The connection failed after it was established.
    #[error("transport failure: {0}")]
    Io(String),

    /// The request could not be built from the caller's input.
    #[error("request could not be built: {0}")]
    InvalidRequest(String),

    /// The remote rejected the call with a status.
    #[error("remote rejected the call with status {status}")]
    Rejected {
        /// Protocol-level status code.
        status: u16,
        /// Error detail returned by the remote.
        body: String,
    },
}

/// One HTTP request as sent on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Deadline for the exchange.
    pub timeout: Duration,
}

/// One HTTP response as received from the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Headers with lowercase names.
    pub headers: BTreeMap<String, String>,
    /// Raw body text.
    pub body: String,
}

/// Sends a single HTTP request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends `request` and returns the raw response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response is received.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// Frame received in reply to a WebSocket message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebsocketReply {
    /// UTF-8 text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

/// Performs a single WebSocket request/response exchange.
#[async_trait]
pub trait WebsocketConnector: Send + Sync {
    /// Connects to `url`, sends `message`, waits for one data frame and
    /// closes the connection.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the connection fails or closes before
    /// a data frame arrives.
    async fn exchange(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        message: String,
    ) -> Result<WebsocketReply, TransportError>;
}

/// One unary gRPC call with opaque message bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrpcCall {
    /// `host:port` of the server.
    pub target: String,
    /// Fully-qualified method path, `/package.Service/Method`.
    pub method: String,
    /// Encoded request message.
    pub body: Vec<u8>,
    /// Call metadata with lowercase keys.
    pub metadata: Vec<(String, String)>,
    /// Deadline for the call.
    pub timeout: Duration,
}

/// Executes unary gRPC calls.
#[async_trait]
pub trait GrpcInvoker: Send + Sync {
    /// Performs `call` and returns the encoded response message.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Rejected`] for a non-OK gRPC status and the
    /// other variants for transport failures.
    async fn unary(&self, call: GrpcCall) -> Result<Vec<u8>, TransportError>;
}
