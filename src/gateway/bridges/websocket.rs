//! Bridge for single-exchange WebSocket invocations.

use super::common::{map_transport, parse_body, parse_bytes, payload_or_empty, resolve_target};
use crate::agent::domain::Protocol;
use crate::gateway::domain::{DispatchTarget, GatewayError, InvocationRequest, InvocationResult};
use crate::gateway::ports::{WebsocketConnector, WebsocketReply};
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

/// What the WebSocket bridge needs to run.
pub(crate) const DEPENDENCY: &str = "the `websocket` cargo feature or a custom connector";

pub(crate) async fn invoke(
    connector: Option<&dyn WebsocketConnector>,
    target: &DispatchTarget,
    request: &InvocationRequest,
    timeout: Duration,
) -> Result<InvocationResult, GatewayError> {
    let Some(socket) = connector else {
        return Err(GatewayError::bridge_unavailable(
            Protocol::Websocket,
            DEPENDENCY,
        ));
    };
    let url = to_websocket_url(&resolve_target(
        &target.endpoint,
        request.path.as_deref(),
    ));
    let message = json!({
        "agent_id": target.agent_id.as_str(),
        "skill": request.skill,
        "payload": payload_or_empty(&request.payload),
    })
    .to_string();

    let started = Instant::now();
    let reply = socket
        .exchange(&url, &request.headers, message)
        .await
        .map_err(|err| map_transport(err, &url, timeout))?;
    let response = match reply {
        WebsocketReply::Text(text) => parse_body(&text),
        WebsocketReply::Binary(bytes) => parse_bytes(bytes),
    };
    Ok(InvocationResult {
        protocol: Protocol::Websocket,
        target: url,
        status: 200,
        ok: true,
        latency: started.elapsed(),
        response,
        response_headers: BTreeMap::new(),
    })
}

/// Maps `http` to `ws` and `https` to `wss`; scheme-less targets get `ws://`.
pub(crate) fn to_websocket_url(url: &str) -> String {
    match url.split_once("://") {
        None => format!("ws://{}", url.trim_start_matches('/')),
        Some(("http", rest)) => format!("ws://{rest}"),
        Some(("https", rest)) => format!("wss://{rest}"),
        Some(_) => url.to_owned(),
    }
}
