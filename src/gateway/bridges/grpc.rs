//! Bridge for unary gRPC calls through an injected invoker.

use super::common::{map_transport, parse_bytes};
use crate::agent::domain::Protocol;
use crate::gateway::domain::{DispatchTarget, GatewayError, InvocationRequest, InvocationResult};
use crate::gateway::ports::{GrpcCall, GrpcInvoker};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// What the gRPC bridge needs to run.
pub(crate) const DEPENDENCY: &str = "a gRPC unary invoker";

pub(crate) async fn invoke(
    invoker: Option<&dyn GrpcInvoker>,
    target: &DispatchTarget,
    request: &InvocationRequest,
    timeout: Duration,
) -> Result<InvocationResult, GatewayError> {
    let Some(unary) = invoker else {
        return Err(GatewayError::bridge_unavailable(Protocol::Grpc, DEPENDENCY));
    };
    let method = request.path.as_deref().map(str::trim).unwrap_or_default();
    if !is_method_path(method) {
        return Err(GatewayError::InvalidRequest(format!(
            "gRPC invocations require a path like /package.Service/Method, got {method:?}"
        )));
    }

    let address = server_address(&target.endpoint);
    let display = format!("grpc://{address}{method}");
    let call = GrpcCall {
        target: address,
        method: method.to_owned(),
        body: encode_message(&request.payload)?,
        metadata: request
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
            .collect(),
        timeout,
    };

    let started = Instant::now();
    let reply = unary
        .unary(call)
        .await
        .map_err(|err| map_transport(err, &display, timeout))?;
    Ok(InvocationResult {
        protocol: Protocol::Grpc,
        target: display,
        status: 200,
        ok: true,
        latency: started.elapsed(),
        response: parse_bytes(reply),
        response_headers: BTreeMap::new(),
    })
}

/// Checks the `/package.Service/Method` shape.
pub(crate) fn is_method_path(path: &str) -> bool {
    path.strip_prefix('/')
        .and_then(|rest| rest.split_once('/'))
        .is_some_and(|(service, method)| {
            !method.is_empty()
                && !method.contains('/')
                && service.contains('.')
                && service.split('.').all(|part| !part.is_empty())
        })
}

/// Extracts `host:port` from an endpoint with or without a scheme.
pub(crate) fn server_address(endpoint: &str) -> String {
    let without_scheme = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest)
        .trim_start_matches('/');
    without_scheme
        .split('/')
        .next()
        .unwrap_or(without_scheme)
        .to_owned()
}

/// Encodes the request message.
///
/// `body_base64`, `body_text` and `body_bytes` members carry pre-encoded
/// messages; any other payload is sent as its JSON text.
fn encode_message(payload: &Value) -> Result<Vec<u8>, GatewayError> {
    if let Some(encoded) = payload.get("body_base64") {
        let text = encoded.as_str().ok_or_else(|| {
            GatewayError::InvalidRequest("body_base64 must be a string".to_owned())
        })?;
        return STANDARD
            .decode(text)
            .map_err(|err| GatewayError::InvalidRequest(format!("invalid body_base64: {err}")));
    }
    if let Some(text) = payload.get("body_text").and_then(Value::as_str) {
        return Ok(text.as_bytes().to_vec());
    }
    if let Some(Value::Array(items)) = payload.get("body_bytes") {
        return items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|byte| u8::try_from(byte).ok())
                    .ok_or_else(|| {
                        GatewayError::InvalidRequest(
                            "body_bytes must contain integers in 0..=255".to_owned(),
                        )
                    })
            })
            .collect();
    }
    serde_json::to_vec(payload).map_err(|err| GatewayError::InvalidRequest(err.to_string()))
}
