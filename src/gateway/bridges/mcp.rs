//! Bridge for Model Context Protocol servers reachable over HTTP.

use super::common::{
    exchange_http, insert_header_if_absent, payload_or_empty, require_post, resolve_target,
};
use crate::agent::domain::Protocol;
use crate::gateway::domain::{DispatchTarget, GatewayError, InvocationRequest, InvocationResult};
use crate::gateway::ports::{HttpTransport, TransportRequest};
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_PATH: &str = "/mcp/invoke";

pub(crate) async fn invoke(
    transport: &dyn HttpTransport,
    target: &DispatchTarget,
    request: &InvocationRequest,
    timeout: Duration,
) -> Result<InvocationResult, GatewayError> {
    require_post(Protocol::Mcp, request.method)?;
    let url = resolve_target(
        &target.endpoint,
        Some(request.path.as_deref().unwrap_or(DEFAULT_PATH)),
    );
    let payload = payload_or_empty(&request.payload);
    let (method, params) = request.skill.as_ref().map_or_else(
        || {
            (
                "agentmesh/invoke",
                json!({ "agent_id": target.agent_id.as_str(), "payload": payload }),
            )
        },
        |skill| {
            (
                "tools/call",
                json!({
                    "name": skill,
                    "arguments": payload,
                    "agent_id": target.agent_id.as_str(),
                }),
            )
        },
    );
    let body = json!({
        "jsonrpc": "2.0",
        "id": Uuid::new_v4().to_string(),
        "method": method,
        "params": params,
    });
    let mut headers = request.headers.clone();
    insert_header_if_absent(&mut headers, "Content-Type", "application/json");

    let result = exchange_http(
        transport,
        Protocol::Mcp,
        TransportRequest {
            method: request.method,
            url,
            headers,
            query: Vec::new(),
            body: Some(body),
            timeout,
        },
    )
    .await?;

    match result.response.get("error") {
        Some(error) if !error.is_null() => Err(GatewayError::RemoteError {
            target: result.target,
            status: result.status,
            body: rpc_error_body(error),
        }),
        _ => Ok(result),
    }
}

fn rpc_error_body(error: &Value) -> String {
    json!({ "error": error }).to_string()
}
