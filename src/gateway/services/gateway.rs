//! Protocol dispatch service.
//!
//! Provides [`ProtocolGateway`], which routes an invocation to the bridge for
//! the agent's protocol and enforces the deadline around the whole exchange.

use crate::agent::domain::Protocol;
use crate::gateway::adapters::ReqwestTransport;
use crate::gateway::bridges::{a2a, common, grpc, http, mcp, websocket};
use crate::gateway::domain::{
    DispatchTarget, GatewayConfig, GatewayError, InvocationRequest, InvocationResult,
    ProtocolAvailability,
};
use crate::gateway::ports::{GrpcInvoker, HttpTransport, WebsocketConnector};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const HTTP_DEPENDENCY: &str = "an HTTP client";

/// Stateless dispatcher from protocol to bridge.
///
/// The gateway never retries. A deadline that expires while a bridge is in
/// flight cancels the bridge future and yields [`GatewayError::Timeout`].
#[derive(Clone)]
pub struct ProtocolGateway {
    config: GatewayConfig,
    http: Arc<dyn HttpTransport>,
    websocket: Option<Arc<dyn WebsocketConnector>>,
    grpc: Option<Arc<dyn GrpcInvoker>>,
}

impl ProtocolGateway {
    /// Creates a gateway with the default transports.
    ///
    /// The WebSocket bridge is wired when the `websocket` feature is enabled;
    /// the gRPC bridge stays unavailable until an invoker is supplied.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BridgeUnavailable`] when the HTTP client
    /// cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let transport = ReqwestTransport::new(&config)
            .map_err(|err| GatewayError::bridge_unavailable(Protocol::Http, err.to_string()))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a gateway over a caller-supplied HTTP transport.
    #[must_use]
    pub fn with_transport(config: GatewayConfig, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            http,
            websocket: default_websocket_connector(),
            grpc: None,
        }
    }

    /// Replaces the WebSocket connector.
    #[must_use]
    pub fn with_websocket_connector(mut self, connector: Arc<dyn WebsocketConnector>) -> Self {
        self.websocket = Some(connector);
        self
    }

    /// Removes the WebSocket connector, making the bridge unavailable.
    #[must_use]
    pub fn without_websocket(mut self) -> Self {
        self.websocket = None;
        self
    }

    /// Supplies the unary invoker the gRPC bridge needs.
    #[must_use]
    pub fn with_grpc_invoker(mut self, invoker: Arc<dyn GrpcInvoker>) -> Self {
        self.grpc = Some(invoker);
        self
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Reports, for every protocol, whether its bridge can run.
    #[must_use]
    pub fn availability(&self) -> Vec<ProtocolAvailability> {
        Protocol::ALL
            .into_iter()
            .map(|protocol| {
                let (available, dependency) = match protocol {
                    Protocol::Http | Protocol::Custom | Protocol::A2a | Protocol::Mcp => {
                        (true, HTTP_DEPENDENCY)
                    }
                    Protocol::Grpc => (self.grpc.is_some(), grpc::DEPENDENCY),
                    Protocol::Websocket => (self.websocket.is_some(), websocket::DEPENDENCY),
                };
                ProtocolAvailability {
                    protocol,
                    available,
                    dependency: dependency.to_owned(),
                }
            })
            .collect()
    }

    /// Dispatches one invocation.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for requests the protocol
    /// cannot carry, [`GatewayError::BridgeUnavailable`] when the bridge is
    /// not wired, and the remote-outcome variants otherwise.
    pub async fn dispatch(
        &self,
        target: &DispatchTarget,
        request: &InvocationRequest,
    ) -> Result<InvocationResult, GatewayError> {
        let timeout = request.timeout.unwrap_or(self.config.default_timeout);
        if timeout.is_zero() {
            return Err(GatewayError::InvalidRequest(
                "timeout must be greater than zero".to_owned(),
            ));
        }
        common::validate_headers(&request.headers)?;

        debug!(
            agent_id = %target.agent_id,
            protocol = %target.protocol,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "dispatching invocation"
        );
        let call = self.route(target, request, timeout);
        let outcome = match tokio::time::timeout(timeout, call).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(GatewayError::Timeout {
                target: common::resolve_target(&target.endpoint, request.path.as_deref()),
                timeout,
            }),
        };
        match &outcome {
            Ok(result) => debug!(
                agent_id = %target.agent_id,
                status = result.status,
                latency_ms = result.latency_ms(),
                "invocation completed"
            ),
            Err(err) => debug!(agent_id = %target.agent_id, error = %err, "invocation failed"),
        }
        outcome
    }

    async fn route(
        &self,
        target: &DispatchTarget,
        request: &InvocationRequest,
        timeout: Duration,
    ) -> Result<InvocationResult, GatewayError> {
        match target.protocol {
            Protocol::Http | Protocol::Custom => {
                http::invoke(self.http.as_ref(), target, request, timeout).await
            }
            Protocol::A2a => a2a::invoke(self.http.as_ref(), target, request, timeout).await,
            Protocol::Mcp => mcp::invoke(self.http.as_ref(), target, request, timeout).await,
            Protocol::Grpc => grpc::invoke(self.grpc.as_deref(), target, request, timeout).await,
            Protocol::Websocket => {
                websocket::invoke(self.websocket.as_deref(), target, request, timeout).await
            }
        }
    }
}

impl std::fmt::Debug for ProtocolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolGateway")
            .field("config", &self.config)
            .field("websocket", &self.websocket.is_some())
            .field("grpc", &self.grpc.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "websocket")]
fn default_websocket_connector() -> Option<Arc<dyn WebsocketConnector>> {
    Some(Arc::new(crate::gateway::adapters::TungsteniteConnector::new()))
}

#[cfg(not(feature = "websocket"))]
const fn default_websocket_connector() -> Option<Arc<dyn WebsocketConnector>> {
    None
}
