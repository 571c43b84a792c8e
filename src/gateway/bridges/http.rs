//! Bridge for the `http` and `custom` protocols.

use super::common::{exchange_http, insert_header_if_absent, resolve_target};
use crate::gateway::domain::{DispatchTarget, GatewayError, InvocationRequest, InvocationResult};
use crate::gateway::ports::{HttpTransport, TransportRequest};
use serde_json::Value;
use std::time::Duration;

/// Header naming the invoked skill.
pub(crate) const SKILL_HEADER: &str = "X-AgentMesh-Skill";

pub(crate) async fn invoke(
    transport: &dyn HttpTransport,
    target: &DispatchTarget,
    request: &InvocationRequest,
    timeout: Duration,
) -> Result<InvocationResult, GatewayError> {
    let url = resolve_target(&target.endpoint, request.path.as_deref());
    let mut headers = request.headers.clone();
    if let Some(skill) = &request.skill {
        insert_header_if_absent(&mut headers, SKILL_HEADER, skill);
    }

    let (query, body) = if request.method.sends_query() {
        (
            query_params(&request.payload, request.skill.as_deref())?,
            None,
        )
    } else {
        (Vec::new(), Some(request.payload.clone()))
    };

    exchange_http(
        transport,
        target.protocol,
        TransportRequest {
            method: request.method,
            url,
            headers,
            query,
            body,
            timeout,
        },
    )
    .await
}

fn query_params(
    payload: &Value,
    skill: Option<&str>,
) -> Result<Vec<(String, String)>, GatewayError> {
    let mut params: Vec<(String, String)> = match payload {
        Value::Null => Vec::new(),
        Value::Object(fields) => fields
            .iter()
            .map(|(name, value)| (name.clone(), query_value(value)))
            .collect(),
        _ => {
            return Err(GatewayError::InvalidRequest(
                "GET and DELETE payloads must be JSON objects".to_owned(),
            ));
        }
    };
    if let Some(name) = skill {
        if !params.iter().any(|(key, _)| key == "skill") {
            params.push(("skill".to_owned(), name.to_owned()));
        }
    }
    Ok(params)
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
