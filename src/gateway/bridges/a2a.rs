//! Bridge for the agent-to-agent JSON envelope.

use super::common::{
    exchange_http, insert_header_if_absent, payload_or_empty, require_post, resolve_target,
};
use crate::agent::domain::Protocol;
use crate::gateway::domain::{DispatchTarget, GatewayError, InvocationRequest, InvocationResult};
use crate::gateway::ports::{HttpTransport, TransportRequest};
use serde_json::json;
use std::time::Duration;

const DEFAULT_PATH: &str = "/a2a/invoke";

pub(crate) async fn invoke(
    transport: &dyn HttpTransport,
    target: &DispatchTarget,
    request: &InvocationRequest,
    timeout: Duration,
) -> Result<InvocationResult, GatewayError> {
    require_post(Protocol::A2a, request.method)?;
    let url = resolve_target(
        &target.endpoint,
        Some(request.path.as_deref().unwrap_or(DEFAULT_PATH)),
    );
    let body = json!({
        "protocol": "a2a",
        "agent_id": target.agent_id.as_str(),
        "skill": request.skill,
        "payload": payload_or_empty(&request.payload),
    });
    let mut headers = request.headers.clone();
    insert_header_if_absent(&mut headers, "Content-Type", "application/json");

    exchange_http(
        transport,
        Protocol::A2a,
        TransportRequest {
            method: request.method,
            url,
            headers,
            query: Vec::new(),
            body: Some(body),
            timeout,
        },
    )
    .await
}
